//! Domain model (entities, task metadata, logs, results, outcomes, errors).

pub mod entity;
pub mod metadata;
pub mod log;
pub mod result;
pub mod state;
pub mod outcome;
pub mod errors;
pub mod text;

pub use self::entity::Entity;
pub use self::errors::{
    BuildError, ConfigError, DispatchError, OptionError, RegistryError, SchemaError, TaskError,
};
pub use self::log::{LogEntry, Severity, TaskLog};
pub use self::metadata::{TaskMetadata, TaskMetadataBuilder, WILDCARD};
pub use self::outcome::{Delivered, InvocationReport, InvocationStatus};
pub use self::result::TaskResult;
pub use self::state::RunState;
pub use self::text::encode_lossy;
