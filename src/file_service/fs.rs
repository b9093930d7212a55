//! The pluggable `FileSystem` abstraction: a real-disk implementation and an
//! in-memory test double, both conforming to the same trait (spec.md §6).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
}

#[derive(Debug, Clone)]
pub struct Stat {
    pub kind: EntryKind,
    pub size: u64,
}

pub trait FileSystem: Send + Sync {
    fn stat(&self, path: &Path) -> std::io::Result<Stat>;
    fn read_file(&self, path: &Path) -> std::io::Result<Vec<u8>>;
    fn read_dir(&self, path: &Path) -> std::io::Result<Vec<PathBuf>>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
}

/// Real-disk implementation, backing production use.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn stat(&self, path: &Path) -> std::io::Result<Stat> {
        let meta = std::fs::symlink_metadata(path)?;
        let kind = if meta.is_symlink() {
            EntryKind::Symlink
        } else if meta.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        };
        Ok(Stat {
            kind,
            size: meta.len(),
        })
    }

    fn read_file(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn read_dir(&self, path: &Path) -> std::io::Result<Vec<PathBuf>> {
        std::fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect()
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

#[derive(Debug, Clone)]
enum MemEntry {
    File(Vec<u8>),
    Dir,
}

/// In-memory `FileSystem` test double. Paths are matched as given — no
/// normalization is attempted beyond what `Path` itself does.
#[derive(Default)]
pub struct InMemoryFileSystem {
    entries: Mutex<HashMap<PathBuf, MemEntry>>,
}

impl InMemoryFileSystem {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn add_file(&self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
        let path = path.into();
        let mut entries = self.entries.lock().unwrap();
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            entries
                .entry(ancestor.to_path_buf())
                .or_insert(MemEntry::Dir);
        }
        entries.insert(path, MemEntry::File(bytes.into()));
    }

    pub fn add_dir(&self, path: impl Into<PathBuf>) {
        self.entries
            .lock()
            .unwrap()
            .insert(path.into(), MemEntry::Dir);
    }
}

impl FileSystem for InMemoryFileSystem {
    fn stat(&self, path: &Path) -> std::io::Result<Stat> {
        let entries = self.entries.lock().unwrap();
        match entries.get(path) {
            Some(MemEntry::File(bytes)) => Ok(Stat {
                kind: EntryKind::File,
                size: bytes.len() as u64,
            }),
            Some(MemEntry::Dir) => Ok(Stat {
                kind: EntryKind::Dir,
                size: 0,
            }),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )),
        }
    }

    fn read_file(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        match self.entries.lock().unwrap().get(path) {
            Some(MemEntry::File(bytes)) => Ok(bytes.clone()),
            Some(MemEntry::Dir) => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "is a directory",
            )),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )),
        }
    }

    fn read_dir(&self, path: &Path) -> std::io::Result<Vec<PathBuf>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .keys()
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect())
    }

    fn exists(&self, path: &Path) -> bool {
        self.entries.lock().unwrap().contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.entries.lock().unwrap().get(path), Some(MemEntry::Dir))
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.entries.lock().unwrap().get(path), Some(MemEntry::File(_)))
    }
}
