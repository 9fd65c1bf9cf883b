// An in-memory model of a configfs mount
//
// Austin Shafer - 2025
use super::{ConfigSurface, DirEntry, EntryKind, SurfaceResult};
use crate::resource::ResourceKind;
use nix::errno::Errno;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
enum MemEntry {
    /// `kernel_owned` directories are default groups created by the
    /// subsystem itself. They cannot be removed directly, only along
    /// with their parent.
    Dir { kernel_owned: bool },
    File(Vec<u8>),
    Symlink(PathBuf),
}

#[derive(Debug, Default)]
struct MemState {
    ms_entries: BTreeMap<PathBuf, MemEntry>,
    /// Default groups to create under any new directory whose parent is
    /// the key
    ms_default_groups: HashMap<PathBuf, Vec<String>>,
    /// Directories that refuse removal, as if something held them busy
    ms_pinned: HashSet<PathBuf>,
    /// Injected failures for create/write/symlink on a path
    ms_failures: HashMap<PathBuf, Errno>,
    /// Number of successful mutations
    ms_mutations: usize,
}

/// In-memory configfs model
///
/// This follows the configfs rules the topology code has to respect:
/// * Subsystems create default groups inside new items. These are kernel
///   owned and `rmdir` on them fails with EPERM.
/// * Attribute files cannot be unlinked (EPERM) but vanish along with
///   their directory.
/// * A directory that is the target of a symlink is busy (EBUSY).
/// * A directory with user created children or symlinks is not empty
///   (ENOTEMPTY).
///
/// Handles are cheap clones sharing the same state, so a test can keep
/// one around to inspect the tree after a session has been dropped.
#[derive(Debug, Clone)]
pub struct MemSurface {
    m_state: Rc<RefCell<MemState>>,
}

impl Default for MemSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemSurface {
    /// An empty tree holding only `/`
    pub fn new() -> Self {
        let mut state = MemState::default();
        state
            .ms_entries
            .insert(PathBuf::from("/"), MemEntry::Dir { kernel_owned: true });

        Self {
            m_state: Rc::new(RefCell::new(state)),
        }
    }

    /// A tree laid out like the vkms configfs subsystem
    ///
    /// The parent of `instance` exists, and creating `instance` will
    /// populate the resource groups and the `possible_*` groups of each
    /// resource the way the vkms driver does.
    pub fn vkms(instance: &Path) -> Self {
        let surf = Self::new();
        if let Some(subsystem) = instance.parent() {
            surf.add_kernel_dirs(subsystem);
            surf.add_default_groups(
                subsystem,
                &[
                    ResourceKind::Connector.group(),
                    ResourceKind::Crtc.group(),
                    ResourceKind::Encoder.group(),
                    ResourceKind::Plane.group(),
                ],
            );
        }

        let possible_crtcs = ResourceKind::Crtc.possible_group();
        let possible_encoders = ResourceKind::Encoder.possible_group();
        surf.add_default_groups(
            &instance.join(ResourceKind::Connector.group()),
            &[possible_encoders.as_str()],
        );
        surf.add_default_groups(
            &instance.join(ResourceKind::Encoder.group()),
            &[possible_crtcs.as_str()],
        );
        surf.add_default_groups(
            &instance.join(ResourceKind::Plane.group()),
            &[possible_crtcs.as_str()],
        );

        surf
    }

    /// Create `path` and all of its ancestors as kernel owned directories
    pub fn add_kernel_dirs(&self, path: &Path) {
        let mut state = self.m_state.borrow_mut();
        for dir in path.ancestors() {
            state
                .ms_entries
                .entry(dir.to_path_buf())
                .or_insert(MemEntry::Dir { kernel_owned: true });
        }
    }

    /// Register default groups for new directories created in `parent`
    pub fn add_default_groups(&self, parent: &Path, groups: &[&str]) {
        self.m_state
            .borrow_mut()
            .ms_default_groups
            .entry(parent.to_path_buf())
            .or_default()
            .extend(groups.iter().map(|g| g.to_string()));
    }

    /// Make removal of this directory fail with EBUSY
    pub fn pin(&self, path: &Path) {
        self.m_state
            .borrow_mut()
            .ms_pinned
            .insert(path.to_path_buf());
    }

    /// Make creating or writing `path` fail with `errno`
    pub fn fail_on(&self, path: &Path, errno: Errno) {
        self.m_state
            .borrow_mut()
            .ms_failures
            .insert(path.to_path_buf(), errno);
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.m_state.borrow().ms_entries.contains_key(path)
    }

    pub fn file_contents(&self, path: &Path) -> Option<Vec<u8>> {
        match self.m_state.borrow().ms_entries.get(path) {
            Some(MemEntry::File(data)) => Some(data.clone()),
            _ => None,
        }
    }

    pub fn read_link(&self, path: &Path) -> Option<PathBuf> {
        match self.m_state.borrow().ms_entries.get(path) {
            Some(MemEntry::Symlink(target)) => Some(target.clone()),
            _ => None,
        }
    }

    /// Every directory strictly below `path`
    pub fn dirs_under(&self, path: &Path) -> Vec<PathBuf> {
        self.m_state
            .borrow()
            .ms_entries
            .iter()
            .filter(|(p, e)| {
                p.as_path() != path
                    && p.starts_with(path)
                    && matches!(e, MemEntry::Dir { .. })
            })
            .map(|(p, _)| p.clone())
            .collect()
    }

    /// How many create/write/symlink/remove calls have succeeded
    pub fn mutation_count(&self) -> usize {
        self.m_state.borrow().ms_mutations
    }
}

impl MemState {
    fn check_failure(&self, path: &Path) -> SurfaceResult<()> {
        match self.ms_failures.get(path) {
            Some(errno) => Err(*errno),
            None => Ok(()),
        }
    }

    /// The parent of `path` must be an existing directory
    fn check_parent(&self, path: &Path) -> SurfaceResult<()> {
        let parent = path.parent().ok_or(Errno::EINVAL)?;
        match self.ms_entries.get(parent) {
            Some(MemEntry::Dir { .. }) => Ok(()),
            Some(_) => Err(Errno::ENOTDIR),
            None => Err(Errno::ENOENT),
        }
    }

    fn children<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = (&'a PathBuf, &'a MemEntry)> {
        self.ms_entries
            .iter()
            .filter(move |(p, _)| p.parent() == Some(path))
    }

    /// Can `path` be removed along with everything below it
    fn check_removable(&self, path: &Path) -> SurfaceResult<()> {
        if self.ms_pinned.contains(path) {
            return Err(Errno::EBUSY);
        }

        // Something still routes to this directory
        let referenced = self.ms_entries.values().any(|e| match e {
            MemEntry::Symlink(target) => target.starts_with(path),
            _ => false,
        });
        if referenced {
            return Err(Errno::EBUSY);
        }

        for (child, entry) in self.children(path) {
            match entry {
                MemEntry::File(_) => {}
                MemEntry::Dir { kernel_owned: true } => self.check_removable(child)?,
                MemEntry::Dir { kernel_owned: false } | MemEntry::Symlink(_) => {
                    return Err(Errno::ENOTEMPTY)
                }
            }
        }

        Ok(())
    }
}

impl ConfigSurface for MemSurface {
    fn create_dir(&self, path: &Path) -> SurfaceResult<()> {
        let mut state = self.m_state.borrow_mut();
        state.check_failure(path)?;
        if state.ms_entries.contains_key(path) {
            return Err(Errno::EEXIST);
        }
        state.check_parent(path)?;

        state
            .ms_entries
            .insert(path.to_path_buf(), MemEntry::Dir { kernel_owned: false });

        let groups = path
            .parent()
            .and_then(|parent| state.ms_default_groups.get(parent))
            .cloned()
            .unwrap_or_default();
        for group in groups {
            state
                .ms_entries
                .insert(path.join(group), MemEntry::Dir { kernel_owned: true });
        }

        state.ms_mutations += 1;
        Ok(())
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> SurfaceResult<()> {
        let mut state = self.m_state.borrow_mut();
        state.check_failure(path)?;
        state.check_parent(path)?;
        if matches!(state.ms_entries.get(path), Some(MemEntry::Dir { .. })) {
            return Err(Errno::EISDIR);
        }

        state
            .ms_entries
            .insert(path.to_path_buf(), MemEntry::File(data.to_vec()));
        state.ms_mutations += 1;
        Ok(())
    }

    fn read_file(&self, path: &Path) -> SurfaceResult<Vec<u8>> {
        match self.m_state.borrow().ms_entries.get(path) {
            Some(MemEntry::File(data)) => Ok(data.clone()),
            Some(MemEntry::Dir { .. }) => Err(Errno::EISDIR),
            Some(MemEntry::Symlink(_)) => Err(Errno::EINVAL),
            None => Err(Errno::ENOENT),
        }
    }

    fn symlink(&self, target: &Path, link: &Path) -> SurfaceResult<()> {
        let mut state = self.m_state.borrow_mut();
        state.check_failure(link)?;
        if state.ms_entries.contains_key(link) {
            return Err(Errno::EEXIST);
        }
        state.check_parent(link)?;

        state
            .ms_entries
            .insert(link.to_path_buf(), MemEntry::Symlink(target.to_path_buf()));
        state.ms_mutations += 1;
        Ok(())
    }

    fn read_dir(&self, path: &Path) -> SurfaceResult<Vec<DirEntry>> {
        let state = self.m_state.borrow();
        match state.ms_entries.get(path) {
            Some(MemEntry::Dir { .. }) => {}
            Some(_) => return Err(Errno::ENOTDIR),
            None => return Err(Errno::ENOENT),
        }

        // BTreeMap keeps these sorted
        Ok(state
            .children(path)
            .map(|(p, e)| DirEntry {
                name: p
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                kind: match e {
                    MemEntry::Dir { .. } => EntryKind::Dir,
                    MemEntry::File(_) => EntryKind::File,
                    MemEntry::Symlink(_) => EntryKind::Symlink,
                },
            })
            .collect())
    }

    fn remove_file(&self, path: &Path) -> SurfaceResult<()> {
        let mut state = self.m_state.borrow_mut();
        match state.ms_entries.get(path) {
            Some(MemEntry::Symlink(_)) => {}
            // configfs attributes live as long as their item
            Some(MemEntry::File(_)) => return Err(Errno::EPERM),
            Some(MemEntry::Dir { .. }) => return Err(Errno::EISDIR),
            None => return Err(Errno::ENOENT),
        }

        state.ms_entries.remove(path);
        state.ms_mutations += 1;
        Ok(())
    }

    fn remove_dir(&self, path: &Path) -> SurfaceResult<()> {
        let mut state = self.m_state.borrow_mut();
        match state.ms_entries.get(path) {
            Some(MemEntry::Dir { kernel_owned: true }) => return Err(Errno::EPERM),
            Some(MemEntry::Dir { kernel_owned: false }) => {}
            Some(_) => return Err(Errno::ENOTDIR),
            None => return Err(Errno::ENOENT),
        }
        state.check_removable(path)?;

        state.ms_entries.retain(|p, _| !p.starts_with(path));
        state.ms_mutations += 1;
        Ok(())
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(
            self.m_state.borrow().ms_entries.get(path),
            Some(MemEntry::Dir { .. })
        )
    }
}
