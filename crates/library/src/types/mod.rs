//! Shared request, report and error types.

pub mod errors;
pub mod reports;
pub mod requests;

pub use errors::{LibraryError, LibraryResult};
pub use reports::{OverdueTransaction, ReturnReceipt};
pub use requests::{BookFilter, NewBook};
