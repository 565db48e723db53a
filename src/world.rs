use std::path::{Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

/// Whether `dir` looks like a world root: it has a `region` or
/// `playerdata` directory, or a `level.dat` file.
pub fn is_world_dir(dir: &Path) -> bool {
    dir.join("region").is_dir() || dir.join("playerdata").is_dir() || dir.join("level.dat").is_file()
}

/// Every world root under `root`, `root` included, in file name order.
///
/// Unreadable directories are logged and skipped.
pub fn find_worlds(root: &Path) -> Vec<PathBuf> {
    let mut worlds = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cannot walk {}: {e}", root.display());
                continue;
            }
        };
        if entry.file_type().is_dir() && is_world_dir(entry.path()) {
            worlds.push(entry.into_path());
        }
    }
    worlds
}
