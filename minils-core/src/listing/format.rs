use chrono::{Local, TimeZone};
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

use super::names::NameService;
use super::structs::{DirectoryEntry, EntryKind, FileRecord, RawMetadata};
use crate::error::ListError;

/// Owner, group and other bits in display order
const PERMISSION_BITS: [(u32, char); 9] = [
    (0o400, 'r'), (0o200, 'w'), (0o100, 'x'),
    (0o040, 'r'), (0o020, 'w'), (0o010, 'x'),
    (0o004, 'r'), (0o002, 'w'), (0o001, 'x'),
];

/// C-locale `%c`: `Sun Jul  8 00:34:60 2001`
const TIME_FORMAT: &str = "%c";

pub fn permission_string(mode: u32) -> String {
    PERMISSION_BITS
        .iter()
        .map(|&(bit, c)| if mode & bit != 0 { c } else { '-' })
        .collect()
}

/// Type character followed by the nine permission characters
pub fn access_field(kind: EntryKind, mode: u32) -> String {
    let mut field = String::with_capacity(10);
    field.push(kind.type_char());
    field.push_str(&permission_string(mode));
    field
}

pub fn link_count_field(nlink: u64) -> String {
    nlink.to_string()
}

/// Byte count, or `major, minor` for character and block devices
pub fn size_field(raw: &RawMetadata) -> String {
    if EntryKind::from_mode(raw.mode).is_device() {
        let dev = raw.rdev as libc::dev_t;
        #[allow(unused_unsafe)]
        let (major, minor) = unsafe { (libc::major(dev), libc::minor(dev)) };
        format!("{}, {}", major, minor)
    } else {
        raw.size.to_string()
    }
}

/// `None` when the timestamp has no single local time
pub fn time_field(seconds: i64) -> Option<String> {
    Local
        .timestamp_opt(seconds, 0)
        .single()
        .map(|time| time.format(TIME_FORMAT).to_string())
}

fn lookup_reason(found: &io::Result<Option<String>>, missing: &str) -> String {
    match found {
        Err(e) => e.to_string(),
        _ => missing.to_string(),
    }
}

impl FileRecord {
    /// Format every field of a long-listing line. The first failing lookup
    /// wins; nothing is partially filled in.
    pub fn build<N: NameService + ?Sized>(
        entry: &DirectoryEntry,
        raw: &RawMetadata,
        names: &N,
    ) -> Result<FileRecord, ListError> {
        let name = || entry.name.to_string_lossy().into_owned();

        let owner = match names.user_name(raw.uid) {
            Ok(Some(owner)) => owner,
            found => {
                return Err(ListError::UserLookup {
                    name: name(),
                    uid: raw.uid,
                    reason: lookup_reason(&found, "no such user"),
                })
            }
        };
        let group = match names.group_name(raw.gid) {
            Ok(Some(group)) => group,
            found => {
                return Err(ListError::GroupLookup {
                    name: name(),
                    gid: raw.gid,
                    reason: lookup_reason(&found, "no such group"),
                })
            }
        };
        let time = time_field(raw.atime).ok_or_else(|| ListError::Time {
            name: name(),
            seconds: raw.atime,
        })?;

        Ok(FileRecord {
            access: access_field(entry.kind, raw.mode),
            links: link_count_field(raw.nlink),
            owner,
            group,
            size: size_field(raw),
            time,
            name: entry.name.clone(),
            link_target: None,
        })
    }

    pub fn with_link_target(mut self, target: Option<PathBuf>) -> Self {
        self.link_target = target;
        self
    }

    /// Write the line with the entry name and link target as raw bytes
    pub fn write_line<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        write!(
            out,
            "{} {}\t{}\t{}\t{}\t{}\t",
            self.access, self.links, self.owner, self.group, self.size, self.time
        )?;
        out.write_all(self.name.as_bytes())?;
        if let Some(target) = &self.link_target {
            out.write_all(b" -> ")?;
            out.write_all(target.as_os_str().as_bytes())?;
        }
        out.write_all(b"\n")
    }
}

impl std::fmt::Display for FileRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}\t{}\t{}\t{}\t{}\t{}",
            self.access,
            self.links,
            self.owner,
            self.group,
            self.size,
            self.time,
            self.name.to_string_lossy()
        )?;
        if let Some(target) = &self.link_target {
            write!(f, " -> {}", target.display())?;
        }
        Ok(())
    }
}
