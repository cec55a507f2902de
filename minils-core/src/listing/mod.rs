pub mod structs;
pub mod filter;
pub mod path;
pub mod names;
pub mod dir;
pub mod format;
pub mod ls;


pub use structs::{ListParams, DirectoryEntry, EntryKind, RawMetadata, FileRecord};
pub use filter::is_visible;
pub use names::{NameService, SystemNames};
pub use dir::{DirStream, TypeHints};
pub use ls::{Lister, ListOutcome, LinkResolver};
