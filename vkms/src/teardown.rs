//! Topology teardown
//!
//! configfs will not let us `rm -rf` a vkms instance. A resource that is
//! the target of a routing link cannot be removed, and default groups
//! created by the driver cannot be removed by hand at all. So teardown
//! goes layer by layer:
//!
//! 1. Stop the composer and disable vkms, then give the kernel time to
//!    release whatever it still holds.
//! 2. Find every `possible_*` directory anywhere in the tree, unlink the
//!    links inside it and try to remove it.
//! 3. Remove the remaining directories depth first.
//!
//! Nothing here fails. Every path that could not be removed ends up in
//! the returned `TeardownReport`.

// Austin Shafer - 2025
use crate::config::SessionConfig;
use crate::control::SystemControl;
use crate::resource::{ResourceGraph, POSSIBLE_PREFIX};
use crate::surface::{ConfigSurface, EntryKind};
use nix::errno::Errno;
use utils::{log, timing};

use std::path::{Path, PathBuf};

/// What a teardown pass did
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TeardownReport {
    /// Routing links that were unlinked
    pub unlinked: Vec<PathBuf>,
    /// Directories that were removed
    pub removed: Vec<PathBuf>,
    /// Default groups the kernel refused to remove (EPERM). These go
    /// away with their parent and are not leftovers.
    pub kernel_owned: Vec<PathBuf>,
    /// Entries that could not be removed for any other reason
    pub skipped: Vec<PathBuf>,
}

impl TeardownReport {
    /// Was the topology root itself removed
    pub fn removed_root(&self, root: &Path) -> bool {
        self.removed.iter().any(|p| p == root)
    }

    fn record_removal(&mut self, dir: PathBuf, result: Result<(), Errno>) {
        match result {
            Ok(()) => self.removed.push(dir),
            Err(Errno::EPERM) => self.kernel_owned.push(dir),
            Err(errno) => {
                log::debug!("Could not remove {}: {}", dir.display(), errno);
                self.skipped.push(dir)
            }
        }
    }
}

/// Shut down vkms and remove everything under the topology root
pub fn teardown<S, C>(config: &SessionConfig, graph: &ResourceGraph<S>, control: &C) -> TeardownReport
where
    S: ConfigSurface,
    C: SystemControl,
{
    let mut report = TeardownReport::default();

    if let Err(e) = control.stop_service(&config.service_name) {
        log::error!("Teardown could not stop {}: {}", config.service_name, e);
    }
    if let Err(e) = graph.set_enabled(false) {
        log::debug!("Teardown could not disable vkms: {}", e);
    }
    // Give the kernel time to release resources
    timing::settle(config.settle_delay);

    // Links have to go before the directories they point at
    cleanup_possible_links(graph.surface(), graph.root(), &mut report);
    cleanup_dir_and_children(graph.surface(), graph.root(), &mut report);

    log::debug!(
        "Teardown of {}: {} links unlinked, {} dirs removed, {} kernel owned, {} skipped",
        graph.root().display(),
        report.unlinked.len(),
        report.removed.len(),
        report.kernel_owned.len(),
        report.skipped.len()
    );
    report
}

/// Recursively find `possible_*` directories and empty them
fn cleanup_possible_links<S: ConfigSurface>(surf: &S, dir: &Path, report: &mut TeardownReport) {
    let entries = match surf.read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };

    for entry in entries.iter().filter(|e| e.kind == EntryKind::Dir) {
        let path = dir.join(&entry.name);

        if !entry.name.starts_with(POSSIBLE_PREFIX) {
            cleanup_possible_links(surf, &path, report);
            continue;
        }

        // Try to remove everything inside, ignoring errors
        for link in surf.read_dir(&path).unwrap_or_default() {
            let link_path = path.join(&link.name);
            match surf.remove_file(&link_path) {
                Ok(()) => report.unlinked.push(link_path),
                Err(_) => report.skipped.push(link_path),
            }
        }

        // Then the directory itself. This usually fails since vkms made
        // it, which is fine.
        let result = surf.remove_dir(&path);
        report.record_removal(path, result);
    }
}

/// Depth first removal of `dir` and every directory under it
fn cleanup_dir_and_children<S: ConfigSurface>(surf: &S, dir: &Path, report: &mut TeardownReport) {
    let entries = match surf.read_dir(dir) {
        Ok(entries) => entries,
        Err(Errno::ENOENT) => {
            log::debug!("Nothing to clean up at {}", dir.display());
            return;
        }
        Err(errno) => {
            log::error!("Failed to open directory {}: {} - skipping", dir.display(), errno);
            report.skipped.push(dir.to_path_buf());
            return;
        }
    };

    for entry in entries.iter().filter(|e| e.kind == EntryKind::Dir) {
        cleanup_dir_and_children(surf, &dir.join(&entry.name), report);
    }

    // Directories the driver created can't be removed by hand, they
    // disappear with their parent. Don't report those failures.
    let result = surf.remove_dir(dir);
    report.record_removal(dir.to_path_buf(), result);
}
