use crate::parser::SEPARATOR;
use std::path::{Component, Path, PathBuf};

/// Converts a root-relative `/`-joined diagram path into a host-native relative path.
///
/// Empty and `.` segments are dropped. Returns `None` if any segment would leave the
/// output directory: a `..` segment, or one the host reads as a root or drive prefix.
pub fn relative_host_path(path: &str) -> Option<PathBuf> {
    let mut host_path = PathBuf::new();

    for segment in path.split(SEPARATOR) {
        for component in Path::new(segment).components() {
            match component {
                // Skip the current-dir marker "."
                Component::CurDir => {}

                Component::Normal(name) => host_path.push(name),

                // "..", "/" and drive prefixes all escape the output directory
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return None;
                }
            }
        }
    }

    Some(host_path)
}
