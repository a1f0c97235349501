pub mod error;
pub mod models;
pub mod validation;
pub mod lifecycle;

pub use error::{ErrorCode, ErrorResponse};
pub use models::*;
pub use validation::*;
pub use lifecycle::LifecycleError;

#[cfg(test)]
mod tests;
