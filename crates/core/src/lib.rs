pub mod config;
pub mod error;
pub mod ids;
pub mod level;
pub mod model;

pub use config::{LoggerConfig, PartialConfig};
pub use error::{CtxlogError, Result};
pub use level::Level;
pub use model::metadata::Metadata;
pub use model::record::LogRecord;
