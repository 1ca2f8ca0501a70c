// Application layer - validation, orchestration and report shapes.
// Storage stays behind the Repository; clients talk to ExpenseService.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
