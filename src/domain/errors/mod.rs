mod engine_errors;
mod validation_errors;

pub use engine_errors::*;
pub use validation_errors::*;
