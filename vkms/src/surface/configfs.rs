// The real configfs mount
//
// Austin Shafer - 2025
use super::{ConfigSurface, DirEntry, EntryKind, SurfaceResult};
use nix::errno::Errno;
use nix::sys::stat::{lstat, Mode, SFlag};
use nix::unistd;

use std::fs;
use std::io::Write;
use std::path::Path;

/// Surface backed by the host filesystem
///
/// This is normally configfs, but nothing here is configfs specific,
/// so it works on any directory tree.
#[derive(Debug, Default, Copy, Clone)]
pub struct ConfigFs;

impl ConfigFs {
    pub fn new() -> Self {
        Self
    }
}

/// Get the errno out of a std io error
fn errno_of(err: std::io::Error) -> Errno {
    err.raw_os_error().map(Errno::from_raw).unwrap_or(Errno::EIO)
}

impl ConfigSurface for ConfigFs {
    fn create_dir(&self, path: &Path) -> SurfaceResult<()> {
        unistd::mkdir(path, Mode::from_bits_truncate(0o777))
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> SurfaceResult<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(errno_of)?;

        file.write_all(data).map_err(errno_of)
    }

    fn read_file(&self, path: &Path) -> SurfaceResult<Vec<u8>> {
        fs::read(path).map_err(errno_of)
    }

    fn symlink(&self, target: &Path, link: &Path) -> SurfaceResult<()> {
        std::os::unix::fs::symlink(target, link).map_err(errno_of)
    }

    fn read_dir(&self, path: &Path) -> SurfaceResult<Vec<DirEntry>> {
        let mut entries = Vec::new();

        for entry in fs::read_dir(path).map_err(errno_of)? {
            let entry = entry.map_err(errno_of)?;
            // file_type does not follow symlinks
            let ty = entry.file_type().map_err(errno_of)?;
            let kind = if ty.is_symlink() {
                EntryKind::Symlink
            } else if ty.is_dir() {
                EntryKind::Dir
            } else {
                EntryKind::File
            };

            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind: kind,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn remove_file(&self, path: &Path) -> SurfaceResult<()> {
        unistd::unlink(path)
    }

    fn remove_dir(&self, path: &Path) -> SurfaceResult<()> {
        fs::remove_dir(path).map_err(errno_of)
    }

    fn is_dir(&self, path: &Path) -> bool {
        match lstat(path) {
            Ok(st) => SFlag::from_bits_truncate(st.st_mode) & SFlag::S_IFMT == SFlag::S_IFDIR,
            Err(_) => false,
        }
    }
}
