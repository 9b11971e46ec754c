use crate::vfs::VirtualFS;
use colored::Colorize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Represents a node in the tree (either file or directory).
#[derive(Debug)]
struct TreeNode {
    name: String,
    children: Vec<Rc<RefCell<TreeNode>>>,
    is_file: bool,
}
impl TreeNode {
    fn new(name: String, is_file: bool) -> Self {
        Self {
            name,
            children: Vec::new(),
            is_file,
        }
    }
}

/// Returns the directory node for `path`, creating any missing ancestors on the way.
///
/// A diagram entry such as `src/bin/` stages `src/bin` without a separate `src` entry,
/// so intermediate directories are filled in here.
fn directory_node(
    path: &Path,
    lookup: &mut HashMap<PathBuf, Rc<RefCell<TreeNode>>>,
) -> Rc<RefCell<TreeNode>> {
    if let Some(node) = lookup.get(path) {
        return Rc::clone(node);
    }

    let parent = directory_node(path.parent().unwrap_or_else(|| Path::new("")), lookup);

    let name = path
        .file_name()
        .map(|os| os.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let node = Rc::new(RefCell::new(TreeNode::new(name, false)));

    parent.borrow_mut().children.push(Rc::clone(&node));

    lookup.insert(path.to_path_buf(), Rc::clone(&node));

    node
}

/// Build the directory tree from the VFS entries, returning the root node.
fn build_tree(vfs: &VirtualFS, destination: &Path) -> Rc<RefCell<TreeNode>> {
    // create a root node to represent the 'destination' directory
    let root_name = destination.display().to_string();

    let root = Rc::new(RefCell::new(TreeNode::new(root_name, false)));

    // map relative path to node, the empty path being the destination itself
    let mut lookup: HashMap<PathBuf, Rc<RefCell<TreeNode>>> = HashMap::new();
    lookup.insert(PathBuf::new(), Rc::clone(&root));

    for entry in vfs.directories() {
        directory_node(&entry.destination, &mut lookup);
    }

    for entry in vfs.files() {
        let Some(file_name) = entry.destination.file_name() else {
            log::debug!("no file name in: {}", entry.destination.display());
            continue;
        };

        let parent_path = entry.destination.parent().unwrap_or_else(|| Path::new(""));
        let parent_node = directory_node(parent_path, &mut lookup);

        let new_child = TreeNode::new(file_name.to_string_lossy().to_string(), true);

        parent_node
            .borrow_mut()
            .children
            .push(Rc::new(RefCell::new(new_child)));
    }

    root
}

/// Renders the tree with the same connectors a diagram uses.
fn render_tree(node: &Rc<RefCell<TreeNode>>, prefix: &str, is_last: bool, out: &mut Vec<String>) {
    let node_borrow = node.borrow();

    let connector = if is_last {
        "└── ".yellow()
    } else {
        "├── ".yellow()
    };
    let name = if node_borrow.is_file {
        node_borrow.name.green()
    } else {
        format!("{}/", node_borrow.name).blue()
    };
    out.push(format!("{}{}{}", prefix.yellow(), connector, name));

    let child_prefix = if is_last {
        format!("{}    ", prefix)
    } else {
        format!("{}│   ", prefix)
    };

    let len = node_borrow.children.len();
    for (i, child) in node_borrow.children.iter().enumerate() {
        let last = i == len - 1;
        render_tree(child, &child_prefix, last, out);
    }
}

fn tree_lines(vfs: &VirtualFS, destination: &Path) -> Vec<String> {
    let tree_root = build_tree(vfs, destination);

    let mut lines = Vec::new();

    render_tree(&tree_root, "", true, &mut lines);

    lines
}

/// Prints the staged [`VirtualFS`] as a tree rooted at `destination`.
pub fn preview_as_tree(vfs: &VirtualFS, destination: &Path) {
    println!(
        "Legend: {} = (directory), {} = (file)",
        "blue".blue(),
        "green".green()
    );

    let fancy_prompt = format!(
        "{} {}\n",
        "┌─".bold().bright_blue(),
        "Preview".bold().bright_blue(),
    );

    println!("{}", fancy_prompt);

    for line in tree_lines(vfs, destination) {
        println!("{}", line);
    }

    println!("\n{}\n", "└─".bold().bright_blue());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    #[test]
    fn test_tree_lines_follow_staged_order() {
        colored::control::set_override(false);

        let tree = parse_str("proj/\n├── src/\n│   └── main.rs\n└── README.md\n");
        let lines = tree_lines(&VirtualFS::stage(&tree), Path::new("out"));

        assert_eq!(
            lines,
            vec![
                "└── out/",
                "    └── proj/",
                "        ├── src/",
                "        │   └── main.rs",
                "        └── README.md",
            ]
        );
    }

    #[test]
    fn test_tree_lines_fill_in_intermediate_directories() {
        colored::control::set_override(false);

        let tree = parse_str("proj/\n└── src/bin/\n    └── tool.rs\n");
        let lines = tree_lines(&VirtualFS::stage(&tree), Path::new("."));

        assert_eq!(
            lines,
            vec![
                "└── ./",
                "    └── proj/",
                "        └── src/",
                "            └── bin/",
                "                └── tool.rs",
            ]
        );
    }
}
