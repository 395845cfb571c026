pub mod clock;
pub mod rate_limiter;
