pub mod api;
pub mod outbound;

pub use api::*;
pub use outbound::*;

/// Chat-transport numeric user identifier.
pub type UserId = i64;
