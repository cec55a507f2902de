use std::ffi::{CStr, CString, OsStr};
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use tracing::debug;

use super::structs::{DirectoryEntry, EntryKind};
use crate::error::ListError;

/// Whether the platform's directory stream reports entry types.
///
/// Checked once when a listing starts; without hints every entry is
/// reported as [`EntryKind::Unknown`] and no stat is issued to find out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeHints {
    Available,
    Unavailable,
}

impl TypeHints {
    pub fn detect() -> Self {
        let hints = if cfg!(any(
            target_os = "solaris",
            target_os = "illumos",
            target_os = "haiku"
        )) {
            TypeHints::Unavailable
        } else {
            TypeHints::Available
        };
        debug!(target: "listing::open", ?hints, "directory type hints");
        hints
    }
}

#[cfg(not(any(target_os = "solaris", target_os = "illumos", target_os = "haiku")))]
fn hinted_kind(entry: &libc::dirent) -> EntryKind {
    match entry.d_type {
        libc::DT_BLK => EntryKind::BlockDevice,
        libc::DT_CHR => EntryKind::CharDevice,
        libc::DT_DIR => EntryKind::Directory,
        libc::DT_FIFO => EntryKind::Fifo,
        libc::DT_LNK => EntryKind::Symlink,
        libc::DT_REG => EntryKind::Regular,
        libc::DT_SOCK => EntryKind::Socket,
        _ => EntryKind::Unknown,
    }
}

#[cfg(any(target_os = "solaris", target_os = "illumos", target_os = "haiku"))]
fn hinted_kind(_entry: &libc::dirent) -> EntryKind {
    EntryKind::Unknown
}

fn clear_errno() {
    #[cfg(any(target_os = "linux", target_os = "android", target_os = "emscripten"))]
    unsafe {
        *libc::__errno_location() = 0;
    }
    #[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd", target_os = "dragonfly"))]
    unsafe {
        *libc::__error() = 0;
    }
    #[cfg(any(target_os = "netbsd", target_os = "openbsd"))]
    unsafe {
        *libc::__errno() = 0;
    }
    #[cfg(any(target_os = "solaris", target_os = "illumos"))]
    unsafe {
        *libc::___errno() = 0;
    }
    #[cfg(target_os = "haiku")]
    unsafe {
        *libc::_errnop() = 0;
    }
}

#[cfg(not(any(
    target_os = "linux", target_os = "android", target_os = "emscripten",
    target_os = "macos", target_os = "ios", target_os = "freebsd", target_os = "dragonfly",
    target_os = "netbsd", target_os = "openbsd",
    target_os = "solaris", target_os = "illumos",
    target_os = "haiku"
)))]
compile_error!("no way to reset errno before readdir on this target");

/// An open directory stream. The handle is closed on drop, whatever way the
/// listing ends.
pub struct DirStream {
    dir: NonNull<libc::DIR>,
    path: PathBuf,
    hints: TypeHints,
}

impl DirStream {
    pub fn open(path: &Path, hints: TypeHints) -> Result<Self, ListError> {
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| ListError::open(path, io::Error::from_raw_os_error(libc::EINVAL)))?;

        let dir = unsafe { libc::opendir(c_path.as_ptr()) };
        match NonNull::new(dir) {
            Some(dir) => Ok(Self { dir, path: path.to_path_buf(), hints }),
            None => Err(ListError::open(path, io::Error::last_os_error())),
        }
    }
}

impl Iterator for DirStream {
    type Item = Result<DirectoryEntry, ListError>;

    fn next(&mut self) -> Option<Self::Item> {
        // readdir signals both end-of-stream and failure with null; only errno
        // tells them apart
        clear_errno();
        let raw = unsafe { libc::readdir(self.dir.as_ptr()) };
        if raw.is_null() {
            let err = io::Error::last_os_error();
            return match err.raw_os_error() {
                None | Some(0) => None,
                Some(_) => Some(Err(ListError::Iteration {
                    path: self.path.to_string_lossy().into_owned(),
                    source: err,
                })),
            };
        }

        // SAFETY: readdir returned a valid entry that lives until the next call
        let raw = unsafe { &*raw };
        let name = unsafe { CStr::from_ptr(raw.d_name.as_ptr()) };
        let kind = match self.hints {
            TypeHints::Available => hinted_kind(raw),
            TypeHints::Unavailable => EntryKind::Unknown,
        };

        Some(Ok(DirectoryEntry {
            name: OsStr::from_bytes(name.to_bytes()).to_os_string(),
            kind,
        }))
    }
}

impl Drop for DirStream {
    fn drop(&mut self) {
        unsafe {
            libc::closedir(self.dir.as_ptr());
        }
        debug!(target: "listing::open", "directory stream closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(stream: DirStream) -> Vec<String> {
        let mut names: Vec<String> = stream
            .map(|entry| entry.unwrap().name.to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_stream_yields_dot_entries_and_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("a"), "").unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();

        let stream = DirStream::open(temp_dir.path(), TypeHints::detect()).unwrap();
        assert_eq!(names(stream), vec![".", "..", "a", "sub"]);
    }

    #[test]
    fn test_hints_report_entry_kinds() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("file"), "").unwrap();
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        std::os::unix::fs::symlink("file", temp_dir.path().join("link")).unwrap();

        let stream = DirStream::open(temp_dir.path(), TypeHints::Available).unwrap();
        for entry in stream {
            let entry = entry.unwrap();
            let expected = match entry.name.to_str().unwrap() {
                "file" => EntryKind::Regular,
                "sub" | "." | ".." => EntryKind::Directory,
                "link" => EntryKind::Symlink,
                other => panic!("unexpected entry {}", other),
            };
            // some filesystems do not fill in d_type
            assert!(entry.kind == expected || entry.kind == EntryKind::Unknown);
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_stale_errno_does_not_end_in_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("file"), "").unwrap();

        let stream = DirStream::open(temp_dir.path(), TypeHints::detect()).unwrap();
        unsafe {
            *libc::__errno_location() = libc::EIO;
        }
        let entries: Vec<_> = stream.collect();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(Result::is_ok));
    }

    #[test]
    fn test_without_hints_everything_is_unknown() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("file"), "").unwrap();

        let stream = DirStream::open(temp_dir.path(), TypeHints::Unavailable).unwrap();
        assert!(stream.map(Result::unwrap).all(|entry| entry.kind == EntryKind::Unknown));
    }

    #[test]
    fn test_open_failures_are_classified() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("plain");
        fs::write(&file, "").unwrap();

        match DirStream::open(&file, TypeHints::detect()) {
            Err(ListError::Open { kind, .. }) => assert_eq!(kind, crate::error::OpenFailure::NotADirectory),
            other => panic!("expected open failure, got {:?}", other.map(|_| ())),
        }
        match DirStream::open(&temp_dir.path().join("missing"), TypeHints::detect()) {
            Err(ListError::Open { kind, .. }) => assert_eq!(kind, crate::error::OpenFailure::NotFound),
            other => panic!("expected open failure, got {:?}", other.map(|_| ())),
        }
    }
}
