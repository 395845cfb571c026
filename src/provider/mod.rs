pub mod client;
pub mod endpoint;
pub mod error;
#[cfg(test)]
pub(crate) mod fake;
pub mod transport;
