use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::ListError;

/// Join a directory and an entry name with a single separator.
///
/// Storage is reserved up front so an allocation failure surfaces as
/// [`ListError::PathComposition`] instead of aborting the process.
pub fn entry_path(base: &Path, name: &OsStr) -> Result<PathBuf, ListError> {
    let mut path = PathBuf::new();
    path.try_reserve(base.as_os_str().len() + name.len() + 1)
        .map_err(|_| ListError::PathComposition {
            name: name.to_string_lossy().into_owned(),
        })?;
    path.push(base);
    path.push(name);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_added_once() {
        let joined = entry_path(Path::new("dir"), OsStr::new("file")).unwrap();
        assert_eq!(joined.as_os_str(), "dir/file");

        let joined = entry_path(Path::new("dir/"), OsStr::new("file")).unwrap();
        assert_eq!(joined.as_os_str(), "dir/file");
    }

    #[test]
    fn test_root_and_current_directory() {
        assert_eq!(entry_path(Path::new("/"), OsStr::new("etc")).unwrap().as_os_str(), "/etc");
        assert_eq!(entry_path(Path::new("."), OsStr::new("a")).unwrap().as_os_str(), "./a");
    }
}
