pub mod config;
pub mod kernel;
pub mod outputs;
pub mod services;

pub use config::ClipdeckConfig;
pub use kernel::controller::TrimController;
pub use kernel::error::TrimError;
pub use kernel::state::OperationState;
pub use kernel::time::{parse_timestamp, validate_range, TimeRange};
pub use outputs::handle::ResourceHandle;
pub use services::trim::{HttpTrimService, TrimService};
