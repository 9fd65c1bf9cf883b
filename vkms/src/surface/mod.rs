//! Configuration surfaces
//!
//! vkms is configured entirely through configfs: directories are
//! resources, small files are attributes, and symlinks express which
//! resources may be routed to which. `ConfigSurface` is the set of
//! primitive filesystem operations the topology code needs, so the same
//! code can drive the real configfs mount or an in-memory model.
//!
//! All errors are reported as the raw `Errno` so callers can log the
//! exact OS failure alongside the path.

// Austin Shafer - 2025
mod configfs;
mod mem;

pub use configfs::ConfigFs;
pub use mem::MemSurface;

use nix::errno::Errno;
use std::path::Path;

pub type SurfaceResult<T> = std::result::Result<T, Errno>;

/// What a directory entry is, without following symlinks
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    File,
    Symlink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

pub trait ConfigSurface {
    /// Create one directory. Fails if it exists or the parent does not.
    fn create_dir(&self, path: &Path) -> SurfaceResult<()>;
    /// Truncate and write a file in a single write
    fn write_file(&self, path: &Path, data: &[u8]) -> SurfaceResult<()>;
    fn read_file(&self, path: &Path) -> SurfaceResult<Vec<u8>>;
    /// Create `link` pointing at `target`
    fn symlink(&self, target: &Path, link: &Path) -> SurfaceResult<()>;
    /// List a directory, sorted by name
    fn read_dir(&self, path: &Path) -> SurfaceResult<Vec<DirEntry>>;
    /// Unlink a file or symlink
    fn remove_file(&self, path: &Path) -> SurfaceResult<()>;
    /// Remove a single directory
    fn remove_dir(&self, path: &Path) -> SurfaceResult<()>;
    /// Is there a directory (not a symlink to one) at this path
    fn is_dir(&self, path: &Path) -> bool;
}
