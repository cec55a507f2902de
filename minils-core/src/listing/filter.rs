use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;

/// Hidden entries start with a dot; this covers `.` and `..` too.
pub fn is_visible(name: &OsStr) -> bool {
    name.as_bytes().first() != Some(&b'.')
}
