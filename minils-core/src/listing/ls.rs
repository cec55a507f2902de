use std::fs;
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use super::dir::{DirStream, TypeHints};
use super::filter::is_visible;
use super::names::{NameService, SystemNames};
use super::path::entry_path;
use super::structs::{DirectoryEntry, EntryKind, FileRecord, ListParams, RawMetadata};
use crate::error::ListError;

/// How a listing ended. None of these change the process exit status.
#[derive(Debug)]
pub enum ListOutcome {
    /// Every entry was visited
    Completed,
    /// The directory could not be opened; nothing was listed
    OpenFailed(ListError),
    /// Listing stopped early; lines already written stand
    Aborted(ListError),
}

impl ListOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, ListOutcome::Completed)
    }
}

/// Resolves the canonical target of a symbolic link
pub type LinkResolver = fn(&Path) -> io::Result<PathBuf>;

fn canonical_target(path: &Path) -> io::Result<PathBuf> {
    fs::canonicalize(path)
}

/// Lists a single directory.
///
/// Short format writes every visible name followed by a space, then one
/// newline. Long format writes one line per entry as soon as it is built.
///
/// Long listings are fail-fast: if stat, the owner or group lookup, or time
/// formatting fails for one entry, that entry is dropped and the rest of the
/// directory is not listed. A symlink whose target cannot be resolved is the
/// exception; it is printed without `-> target`.
pub struct Lister<N: NameService = SystemNames> {
    params: ListParams,
    names: N,
    hints: TypeHints,
    resolve: LinkResolver,
}

impl Lister<SystemNames> {
    pub fn new(params: ListParams) -> Self {
        Self::with_names(params, SystemNames)
    }
}

impl<N: NameService> Lister<N> {
    pub fn with_names(params: ListParams, names: N) -> Self {
        Self {
            params,
            names,
            hints: TypeHints::detect(),
            resolve: canonical_target,
        }
    }

    pub fn with_type_hints(mut self, hints: TypeHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn with_link_resolver(mut self, resolve: LinkResolver) -> Self {
        self.resolve = resolve;
        self
    }

    /// List the directory to `out`, diagnostics to `err`
    pub fn run<W: Write + ?Sized, E: Write + ?Sized>(&self, out: &mut W, err: &mut E) -> ListOutcome {
        let mut stream = match DirStream::open(&self.params.directory, self.hints) {
            Ok(stream) => stream,
            Err(e) => {
                debug!(target: "listing::open", directory = %self.params.directory.display(), error = %e, "open failed");
                report(err, &e);
                return ListOutcome::OpenFailed(e);
            }
        };
        debug!(target: "listing::open", directory = %self.params.directory.display(), long = self.params.long_format, "directory opened");

        let result = self.emit_entries(&mut stream, out, err);
        drop(stream);

        if !self.params.long_format {
            if let Err(e) = out.write_all(b"\n") {
                if result.is_ok() {
                    let e = ListError::Output(e);
                    report(err, &e);
                    return ListOutcome::Aborted(e);
                }
            }
        }
        let _ = out.flush();

        match result {
            Ok(()) => ListOutcome::Completed,
            Err(e) => {
                warn!(target: "listing::entry", error = %e, "listing aborted");
                report(err, &e);
                ListOutcome::Aborted(e)
            }
        }
    }

    fn emit_entries<W: Write + ?Sized, E: Write + ?Sized>(
        &self,
        stream: &mut DirStream,
        out: &mut W,
        err: &mut E,
    ) -> Result<(), ListError> {
        for entry in stream {
            let entry = entry?;
            if !is_visible(&entry.name) {
                trace!(target: "listing::entry", name = ?entry.name, "hidden entry skipped");
                continue;
            }
            trace!(target: "listing::entry", name = ?entry.name, kind = ?entry.kind, "entry");

            if self.params.long_format {
                let record = self.build_record(&entry, err)?;
                record.write_line(out).map_err(ListError::Output)?;
            } else {
                out.write_all(entry.name.as_bytes())
                    .and_then(|_| out.write_all(b" "))
                    .map_err(ListError::Output)?;
            }
        }
        Ok(())
    }

    fn build_record<E: Write + ?Sized>(&self, entry: &DirectoryEntry, err: &mut E) -> Result<FileRecord, ListError> {
        let metadata_error = |source: io::Error| ListError::Metadata {
            name: entry.name.to_string_lossy().into_owned(),
            source,
        };

        let path = entry_path(&self.params.directory, &entry.name)?;
        // stat follows the link: a symlink shows its target's fields
        let metadata = fs::metadata(&path).map_err(metadata_error)?;
        let raw = RawMetadata::from(&metadata);
        let record = FileRecord::build(entry, &raw, &self.names)?;

        let is_link = match entry.kind {
            EntryKind::Symlink => true,
            // no usable hint; lstat only to decide whether to print `-> target`
            EntryKind::Unknown => fs::symlink_metadata(&path).map_err(metadata_error)?.file_type().is_symlink(),
            _ => false,
        };
        if !is_link {
            return Ok(record);
        }

        let target = match (self.resolve)(&path) {
            Ok(target) => Some(target),
            Err(source) => {
                let e = ListError::LinkResolution {
                    name: entry.name.to_string_lossy().into_owned(),
                    source,
                };
                warn!(target: "listing::record", error = %e, "link target unresolved");
                report(err, &e);
                None
            }
        };
        Ok(record.with_link_target(target))
    }
}

fn report<E: Write + ?Sized>(err: &mut E, error: &ListError) {
    let _ = writeln!(err, "{}", error);
}
