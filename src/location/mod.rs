pub mod code_index;
pub mod error;
mod flight_map;
