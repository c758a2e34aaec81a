pub mod errors;
pub mod shutdown;

pub use errors::{AppError, AppResult, DomainError, DomainResult, ErrorKind, InfraError, StoreResult};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};
