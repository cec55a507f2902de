use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a directory could not be opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenFailure {
    PermissionDenied,
    NotFound,
    NotADirectory,
    Other,
}

impl OpenFailure {
    pub fn classify(error: &io::Error) -> Self {
        match error.raw_os_error() {
            Some(libc::EACCES) | Some(libc::EPERM) => OpenFailure::PermissionDenied,
            Some(libc::ENOENT) => OpenFailure::NotFound,
            Some(libc::ENOTDIR) => OpenFailure::NotADirectory,
            _ => OpenFailure::Other,
        }
    }
}

#[derive(Error, Debug)]
pub enum ListError {
    #[error("{}", open_message(.path, .kind, .source))]
    Open {
        path: String,
        kind: OpenFailure,
        #[source]
        source: io::Error,
    },
    #[error("readdir: '{path}': {source}")]
    Iteration {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{name}: stat: {source}")]
    Metadata {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("{name}: getpwuid: cannot resolve user {uid}: {reason}")]
    UserLookup { name: String, uid: u32, reason: String },
    #[error("{name}: getgrgid: cannot resolve group {gid}: {reason}")]
    GroupLookup { name: String, gid: u32, reason: String },
    #[error("{name}: localtime: cannot represent timestamp {seconds}")]
    Time { name: String, seconds: i64 },
    #[error("realpath: {name}: {source}")]
    LinkResolution {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("{name}: cannot compose entry path: out of memory")]
    PathComposition { name: String },
    #[error("write: {0}")]
    Output(#[source] io::Error),
}

fn open_message(path: &str, kind: &OpenFailure, source: &io::Error) -> String {
    match kind {
        OpenFailure::PermissionDenied => format!("'{}': Permission denied", path),
        OpenFailure::NotFound => format!("'{}': Doesn't exist", path),
        OpenFailure::NotADirectory => format!("'{}': Not a directory", path),
        OpenFailure::Other => format!("'{}': {}", path, source),
    }
}

impl ListError {
    pub fn open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ListError::Open {
            path: path.into().to_string_lossy().into_owned(),
            kind: OpenFailure::classify(&source),
            source,
        }
    }
}
