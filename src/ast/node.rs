//! The node record and its identity handle.

use std::sync::Arc;

use crate::ast::jsdoc::JsDoc;
use crate::ast::kind::NodeKind;

/// Index of a node in its [`crate::ast::AstArena`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Source location of a node: file, 1-based line, 0-based column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceInfo {
    pub file: Arc<str>,
    pub line: u32,
    pub column: u32,
}

impl SourceInfo {
    pub fn new(file: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        SourceInfo {
            file: file.into(),
            line,
            column,
        }
    }
}

/// A single AST node.
///
/// Children and the parent back-pointer are managed exclusively by the
/// arena; everything else is plain data the transforms read and write.
#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    /// Name or literal text, depending on the kind. Empty when unused.
    pub string: String,
    /// Numeric payload for `Number` nodes.
    pub double: f64,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,

    // Boolean properties carried over from the parser.
    pub is_static_member: bool,
    pub computed_prop_getter: bool,
    pub computed_prop_setter: bool,
    pub computed_prop_variable: bool,
    pub quoted_string: bool,
    pub var_args: bool,

    pub source: Option<SourceInfo>,
    pub jsdoc: Option<JsDoc>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            string: String::new(),
            double: 0.0,
            children: Vec::new(),
            parent: None,
            is_static_member: false,
            computed_prop_getter: false,
            computed_prop_setter: false,
            computed_prop_variable: false,
            quoted_string: false,
            var_args: false,
            source: None,
            jsdoc: None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.children.first().copied()
    }

    pub fn last_child(&self) -> Option<NodeId> {
        self.children.last().copied()
    }

    pub fn is_empty_kind(&self) -> bool {
        self.kind == NodeKind::Empty
    }
}
