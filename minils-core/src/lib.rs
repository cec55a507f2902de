pub mod config;
pub mod error;
pub mod listing;
pub mod logging;

pub use config::MinilsConfig;
pub use error::{ListError, OpenFailure};
pub use listing::{
    is_visible, DirectoryEntry, EntryKind, FileRecord, LinkResolver, ListOutcome, ListParams, Lister,
    NameService, RawMetadata, SystemNames, TypeHints,
};
pub use logging::LoggingConfig;
