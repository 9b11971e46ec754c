use indexmap::IndexSet;

/// Separator used in every root-relative path produced by [`parse`].
pub const SEPARATOR: char = '/';

/// Marks where an entry name begins in Unicode `tree` output.
const UNICODE_MARKER: &str = "── ";
/// Marks where an entry name begins in `tree --charset=ascii` output.
const ASCII_MARKER: &str = "-- ";
/// Glyphs that must directly precede an [`ASCII_MARKER`] for it to count as a connector.
const ASCII_CONNECTOR_GLYPHS: [char; 3] = ['|', '`', '+'];

/// Characters that only contribute to the visual indent of a line.
fn is_indent_char(c: char) -> bool {
    matches!(
        c,
        ' ' | '\t' | '\u{a0}' | '│' | '├' | '└' | '─' | '|' | '`' | '+'
    )
}

fn is_blank(raw: &str) -> bool {
    raw.trim().is_empty()
}

/// Matches the closing report line of `tree` output, e.g. `3 directories, 7 files`.
fn is_tree_report(raw: &str) -> bool {
    lazy_static::lazy_static! {
        static ref TREE_REPORT_REGEX: regex::Regex = regex::Regex::new(
            r"^\d+ director(?:y|ies)(?:, \d+ files?)?$"
        ).expect("a valid regex pattern");
    }

    // `tree` prints its report unindented, an indented line is always an entry
    TREE_REPORT_REGEX.is_match(raw.trim_end())
}

/// Whether a diagram entry denotes a directory (trailing `/`) or a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// A single non-blank diagram line below the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// The line as it appeared in the diagram, without its newline.
    pub raw: String,
    /// Positional indent, counted in characters before the entry name.
    pub depth: usize,
    /// The entry name with any trailing separator removed.
    pub name: String,
    pub kind: EntryKind,
}
impl Line {
    /// Reads a raw diagram line into a [`Line`].
    ///
    /// Returns `None` when the line carries no name: blank lines and spacer lines made
    /// only of connector glyphs (a lone `│` between two groups, for instance).
    pub fn read(raw: &str) -> Option<Self> {
        let (depth, rest) = split_indent(raw);
        let rest = rest.trim();

        let kind = if rest.ends_with(SEPARATOR) {
            EntryKind::Directory
        } else {
            EntryKind::File
        };

        let name = rest.trim_end_matches(SEPARATOR).trim_end();

        if name.is_empty() {
            return None;
        }

        Some(Self {
            raw: raw.to_string(),
            depth,
            name: name.to_string(),
            kind,
        })
    }
}

/// Splits a line into its depth and the text where the name begins.
///
/// When a connector marker is preceded only by indent characters, the depth is the
/// number of characters up to and including the marker. An ASCII marker also needs a
/// connector glyph right before it, so `    -- notes` stays a name. Otherwise the depth
/// is the number of leading indent characters.
fn split_indent(raw: &str) -> (usize, &str) {
    let connector = [UNICODE_MARKER, ASCII_MARKER].iter().find_map(|marker| {
        let at = raw.find(marker)?;
        let prefix = &raw[..at];

        let glyph_led = *marker != ASCII_MARKER || prefix.ends_with(ASCII_CONNECTOR_GLYPHS);

        (glyph_led && prefix.chars().all(is_indent_char)).then(|| {
            (
                prefix.chars().count() + marker.chars().count(),
                &raw[at + marker.len()..],
            )
        })
    });

    if let Some(split) = connector {
        return split;
    }

    // a leading `+` outside a connector belongs to the name (`+page.svelte`)
    let rest = raw.trim_start_matches(|c: char| c != '+' && is_indent_char(c));

    (raw[..raw.len() - rest.len()].chars().count(), rest)
}

/// An ancestor directory that later lines may still nest under.
#[derive(Debug)]
struct OpenDir {
    name: String,
    depth: usize,
}

/// Directories and files recovered from a diagram, as root-relative `/`-joined paths.
///
/// Both sets keep the order in which entries first appeared in the diagram.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedTree {
    pub directories: IndexSet<String>,
    pub files: IndexSet<String>,
}
impl ParsedTree {
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.files.is_empty()
    }
}

fn join_path(stack: &[OpenDir], name: &str) -> String {
    let mut path = stack
        .iter()
        .map(|dir| dir.name.as_str())
        .collect::<Vec<_>>()
        .join("/");

    path.push(SEPARATOR);
    path.push_str(name);

    path
}

/// Parses the lines of a tree diagram into a [`ParsedTree`].
///
/// The first non-blank line names the root directory; every later line is attached to
/// the nearest open directory introduced at a smaller depth. Irregular indentation is
/// never an error, an ambiguous line simply attaches to whatever directory is open.
///
/// # Example
///
/// ```
/// let tree = plantree::parser::parse_str("proj/\n├── src/\n│   └── main.rs\n└── README.md\n");
///
/// assert!(tree.directories.contains("proj/src"));
/// assert!(tree.files.contains("proj/src/main.rs"));
/// assert!(tree.files.contains("proj/README.md"));
/// ```
pub fn parse<I, S>(lines: I) -> ParsedTree
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tree = ParsedTree::default();
    let mut lines = lines.into_iter().filter(|raw| !is_blank(raw.as_ref()));

    let Some(root_line) = lines.next() else {
        return tree;
    };

    let root = root_line
        .as_ref()
        .trim()
        .trim_end_matches(SEPARATOR)
        .to_string();

    log::debug!("root directory: '{}'", root);

    tree.directories.insert(root.clone());

    // the root is never popped, so its depth never takes part in a comparison
    let mut stack = vec![OpenDir {
        name: root,
        depth: 0,
    }];

    for raw in lines {
        if is_tree_report(raw.as_ref()) {
            log::debug!("skipping tree report: '{}'", raw.as_ref().trim());
            continue;
        }

        let Some(line) = Line::read(raw.as_ref()) else {
            continue;
        };

        while stack.len() > 1 && stack.last().is_some_and(|top| line.depth <= top.depth) {
            stack.pop();
        }

        let path = join_path(&stack, &line.name);

        log::debug!("depth {:>3}: {}", line.depth, path);

        match line.kind {
            EntryKind::Directory => {
                tree.directories.insert(path);

                stack.push(OpenDir {
                    name: line.name,
                    depth: line.depth,
                });
            }
            EntryKind::File => {
                tree.files.insert(path);
            }
        }
    }

    tree
}

/// Parses a whole diagram held in memory. See [`parse`].
pub fn parse_str(text: &str) -> ParsedTree {
    parse(text.lines())
}
