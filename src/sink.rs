use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use errors::*;

/// The destination file. Shared by both duplicators; every `write` holds the
/// lock for the whole chunk so chunks never interleave mid-way.
#[derive(Debug)]
pub struct Sink {
    path: PathBuf,
    file: Mutex<File>,
}

impl Sink {
    pub fn open(path: &Path, append: bool) -> Result<Sink> {
        let mut options = OpenOptions::new();
        options.create(true);
        if append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }
        let file = options
            .open(path)
            .chain_err(|| ErrorKind::Sink(path.to_owned()))?;
        debug!("sink: {:?} (append: {:?})", path, append);

        Ok(Sink {
            path: path.to_owned(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, bytes: &[u8]) -> Result<()> {
        self.lock()
            .write_all(bytes)
            .chain_err(|| ErrorKind::Sink(self.path.clone()))
    }

    /// Flushes and, for regular files, syncs to storage.
    pub fn close(&self) -> Result<()> {
        let mut file = self.lock();
        file.flush()
            .chain_err(|| ErrorKind::Sink(self.path.clone()))?;
        let meta = file.metadata()
            .chain_err(|| ErrorKind::Sink(self.path.clone()))?;
        if meta.is_file() {
            file.sync_all()
                .chain_err(|| ErrorKind::Sink(self.path.clone()))?;
        }
        debug!("sink closed: {:?} ({} bytes)", self.path, meta.len());
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, File> {
        // A writer that panicked mid-chunk has still left the file usable.
        self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
