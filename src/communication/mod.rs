pub mod error_handler;
pub mod notifier;

pub use error_handler::{ApiError, DataResponse};
pub use notifier::{dispatch, EdgeFunctionNotifier, Notifier, NotifyError};
