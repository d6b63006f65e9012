//! Syntax-tree model consumed from the external script parser.
//!
//! The narrative parser/compiler is a black box: it turns source text into
//! an annotated tree or reports errors through its own channel. This module
//! fixes the shape of that tree as the generator sees it — a tagged-variant
//! node type instead of free-form type-name strings, so traversal is
//! exhaustive by construction.
//!
//! Parsers emit narrative text and line breaks as separate [`NodeKind::Text`]
//! nodes (a line break is the text `"\n"`), which is what makes the
//! "tag attached to the preceding text" rule expressible as a sibling scan.

/// Named-container level used to build identifier prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// Top-level grouping construct (a scene or knot).
    Major,
    /// Nested grouping construct (a sub-scene or stitch).
    Minor,
}

/// What a syntax node is, reduced to the categories the generator needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A run of narrative or choice text; line breaks arrive as `"\n"`.
    Text(String),
    /// A grouping construct. Only named containers contribute to prefixes;
    /// anonymous ones (weave blocks, choice bodies) are traversed silently.
    Container {
        /// Major or minor level.
        kind: ContainerKind,
        /// Name as written in the script, if the container has one.
        name: Option<String>,
    },
    /// A `#`-tag attached to nearby text; carries the body without the `#`.
    Tag(String),
    /// A variable assignment or interpolated-string context; text inside is
    /// never a tagging candidate.
    Assignment,
    /// Anything else the parser produces; traversed, otherwise ignored.
    Other,
}

/// Source position recorded by the parser (debug-metadata convention:
/// 1-based line numbers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    /// File the node came from.
    pub file: String,
    /// 1-based line number within that file.
    pub line: usize,
}

/// One node of the parsed tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    /// The node's category and payload.
    pub kind: NodeKind,
    /// Source position, when the parser recorded one.
    pub origin: Option<Origin>,
    /// Child nodes in document order.
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// A text node with a source position.
    pub fn text(text: impl Into<String>, file: impl Into<String>, line: usize) -> Self {
        Self {
            kind: NodeKind::Text(text.into()),
            origin: Some(Origin {
                file: file.into(),
                line,
            }),
            children: Vec::new(),
        }
    }

    /// A line-break text node.
    pub fn line_break() -> Self {
        Self {
            kind: NodeKind::Text("\n".to_string()),
            origin: None,
            children: Vec::new(),
        }
    }

    /// A container node; pass `None` for anonymous containers.
    pub fn container(kind: ContainerKind, name: Option<&str>) -> Self {
        Self {
            kind: NodeKind::Container {
                kind,
                name: name.map(str::to_string),
            },
            origin: None,
            children: Vec::new(),
        }
    }

    /// A tag node; `body` is the tag text without the leading `#`.
    pub fn tag(body: impl Into<String>, file: impl Into<String>, line: usize) -> Self {
        Self {
            kind: NodeKind::Tag(body.into()),
            origin: Some(Origin {
                file: file.into(),
                line,
            }),
            children: Vec::new(),
        }
    }

    /// An assignment/interpolation context wrapping its children.
    pub fn assignment(children: Vec<SyntaxNode>) -> Self {
        Self {
            kind: NodeKind::Assignment,
            origin: None,
            children,
        }
    }

    /// An uncategorized grouping node.
    pub fn other() -> Self {
        Self {
            kind: NodeKind::Other,
            origin: None,
            children: Vec::new(),
        }
    }

    /// Attach children, builder-style.
    pub fn with_children(mut self, children: Vec<SyntaxNode>) -> Self {
        self.children = children;
        self
    }

    /// Whether this is a line-break text node.
    pub fn is_line_break(&self) -> bool {
        matches!(&self.kind, NodeKind::Text(text) if text == "\n")
    }
}

/// A parsed document set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    /// Root node; only its subtree is traversed.
    pub root: SyntaxNode,
}

impl SyntaxTree {
    /// Wrap an existing root node.
    pub fn new(root: SyntaxNode) -> Self {
        Self { root }
    }

    /// Build a tree whose root holds the given top-level nodes.
    pub fn from_nodes(nodes: Vec<SyntaxNode>) -> Self {
        Self {
            root: SyntaxNode::other().with_children(nodes),
        }
    }

    /// A tree with nothing in it (parser had no output).
    pub fn empty() -> Self {
        Self {
            root: SyntaxNode::other(),
        }
    }
}
