pub mod engine;
pub mod limiter;
pub mod queue;
