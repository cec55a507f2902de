use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListParams {
    /// Directory to list (defaults to current directory)
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    /// One line per entry with permissions, owner, size and time
    #[serde(default)]
    pub long_format: bool,
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

impl ListParams {
    /// An absent or empty directory argument means the current directory.
    pub fn new(directory: Option<impl Into<PathBuf>>, long_format: bool) -> Self {
        let directory: Option<PathBuf> = directory.map(Into::into);
        let directory = directory
            .filter(|path| !path.as_os_str().is_empty())
            .unwrap_or_else(default_directory);
        Self { directory, long_format }
    }
}

impl Default for ListParams {
    fn default() -> Self {
        Self::new(None::<PathBuf>, false)
    }
}

/// File type as reported by the directory stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    BlockDevice,
    CharDevice,
    Directory,
    Fifo,
    Symlink,
    Regular,
    Socket,
    Unknown,
}

impl EntryKind {
    pub fn type_char(self) -> char {
        match self {
            EntryKind::BlockDevice => 'b',
            EntryKind::CharDevice => 'c',
            EntryKind::Directory => 'd',
            EntryKind::Fifo => 'p',
            EntryKind::Symlink => 'l',
            EntryKind::Regular => '-',
            EntryKind::Socket => 's',
            EntryKind::Unknown => 'u',
        }
    }

    /// Kind encoded in the `S_IFMT` bits of a stat mode
    pub fn from_mode(mode: u32) -> Self {
        match mode & S_IFMT {
            S_IFBLK => EntryKind::BlockDevice,
            S_IFCHR => EntryKind::CharDevice,
            S_IFDIR => EntryKind::Directory,
            S_IFIFO => EntryKind::Fifo,
            S_IFLNK => EntryKind::Symlink,
            S_IFREG => EntryKind::Regular,
            S_IFSOCK => EntryKind::Socket,
            _ => EntryKind::Unknown,
        }
    }

    pub fn is_device(self) -> bool {
        matches!(self, EntryKind::BlockDevice | EntryKind::CharDevice)
    }
}

// mode_t is u16 on some platforms, the metadata API always hands out u32
const S_IFMT: u32 = libc::S_IFMT as u32;
const S_IFBLK: u32 = libc::S_IFBLK as u32;
const S_IFCHR: u32 = libc::S_IFCHR as u32;
const S_IFDIR: u32 = libc::S_IFDIR as u32;
const S_IFIFO: u32 = libc::S_IFIFO as u32;
const S_IFLNK: u32 = libc::S_IFLNK as u32;
const S_IFREG: u32 = libc::S_IFREG as u32;
const S_IFSOCK: u32 = libc::S_IFSOCK as u32;

/// One item read from a directory stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: OsString,
    pub kind: EntryKind,
}

/// The stat fields a long listing needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawMetadata {
    pub mode: u32,
    pub nlink: u64,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
    pub rdev: u64,
    pub atime: i64,
}

impl From<&fs::Metadata> for RawMetadata {
    fn from(metadata: &fs::Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self {
            mode: metadata.mode(),
            nlink: metadata.nlink(),
            uid: metadata.uid(),
            gid: metadata.gid(),
            size: metadata.size(),
            rdev: metadata.rdev(),
            atime: metadata.atime(),
        }
    }
}

/// Formatted fields of one long-listing line, built fresh for every entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub access: String,
    pub links: String,
    pub owner: String,
    pub group: String,
    pub size: String,
    pub time: String,
    pub name: OsString,
    pub link_target: Option<PathBuf>,
}
