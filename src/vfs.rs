use crate::{parser::ParsedTree, utils::relative_host_path};
use std::path::PathBuf;

/// Represents a directory or empty file to be created, staged in memory before writing to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualEntry {
    /// Host-native path relative to the output directory.
    pub destination: PathBuf,
    /// Indicates whether this entry is a file (`true`) or a directory (`false`).
    pub is_file: bool,
}
/// Represents a virtual file system composed of multiple [`VirtualEntry`] values.
///
/// Entries are ordered so that every directory comes before anything that lives under
/// it: all directories first, then all files, each group sorted by path.
#[derive(Debug, Clone, Default)]
pub struct VirtualFS {
    pub entries: Vec<VirtualEntry>,
    /// Diagram paths that would escape the output directory and were left out.
    pub rejected: Vec<String>,
}
impl VirtualFS {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages every directory and file of a [`ParsedTree`].
    pub fn stage(tree: &ParsedTree) -> Self {
        let mut vfs = Self::new();

        vfs.stage_group(tree.directories.iter(), false);
        vfs.stage_group(tree.files.iter(), true);

        vfs
    }

    fn stage_group<'a>(&mut self, paths: impl Iterator<Item = &'a String>, is_file: bool) {
        let mut paths: Vec<&String> = paths.collect();
        paths.sort();

        let mut staged: Vec<PathBuf> = Vec::with_capacity(paths.len());

        for path in paths {
            match relative_host_path(path) {
                Some(destination) => staged.push(destination),
                None => {
                    log::warn!("rejecting '{}': it leaves the output directory", path);
                    self.rejected.push(path.clone());
                }
            }
        }

        // "./src" and "src" land on the same destination
        staged.dedup();

        self.entries.extend(
            staged
                .into_iter()
                .map(|destination| VirtualEntry {
                    destination,
                    is_file,
                }),
        );
    }

    pub fn directories(&self) -> impl Iterator<Item = &VirtualEntry> {
        self.entries.iter().filter(|entry| !entry.is_file)
    }

    pub fn files(&self) -> impl Iterator<Item = &VirtualEntry> {
        self.entries.iter().filter(|entry| entry.is_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;
    use std::path::Path;

    #[test]
    fn test_stage_orders_directories_before_files() {
        let tree = parse_str("proj/\n├── z.txt\n├── b/\n│   └── c/\n├── a.txt\n└── a/\n");
        let vfs = VirtualFS::stage(&tree);

        let directories: Vec<_> = vfs.directories().map(|e| e.destination.clone()).collect();
        let files: Vec<_> = vfs.files().map(|e| e.destination.clone()).collect();

        assert_eq!(
            directories,
            vec![
                PathBuf::from("proj"),
                Path::new("proj").join("a"),
                Path::new("proj").join("b"),
                Path::new("proj").join("b").join("c"),
            ]
        );
        assert_eq!(
            files,
            vec![Path::new("proj").join("a.txt"), Path::new("proj").join("z.txt")]
        );
        assert!(vfs.entries.iter().take(4).all(|e| !e.is_file));
        assert!(vfs.rejected.is_empty());
    }

    #[test]
    fn test_stage_rejects_escaping_paths() {
        let tree = parse_str("proj/\n├── ../\n│   └── evil.txt\n└── fine.txt\n");
        let vfs = VirtualFS::stage(&tree);

        assert_eq!(vfs.rejected, vec!["proj/..", "proj/../evil.txt"]);
        assert_eq!(vfs.files().count(), 1);
    }
}
