//! Node storage and tree surgery.
//!
//! All structural mutation goes through the arena so parent back-pointers
//! stay consistent. The re-parenting protocol is detach-then-attach: a
//! node must be detached (or freshly created/cloned) before it can be
//! attached somewhere else; the attach methods assert this.
//!
//! Detached subtrees that are never re-attached stay allocated until the
//! arena is dropped. A pass produces few of those and the arena lives for
//! one compilation, so nothing reclaims them eagerly.

use crate::ast::jsdoc::JsDoc;
use crate::ast::kind::NodeKind;
use crate::ast::node::{Node, NodeId, SourceInfo};

#[derive(Default)]
pub struct AstArena {
    nodes: Vec<Node>,
}

impl AstArena {
    pub fn new() -> AstArena {
        AstArena::default()
    }

    pub fn with_capacity(capacity: usize) -> AstArena {
        AstArena {
            nodes: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a bare node of the given kind, with no payload, children,
    /// parent or source info.
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind));
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.index()].kind
    }

    // ------------------------------------------------------------------
    // Structure accessors
    // ------------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Owned snapshot of the child list, for loops that mutate the tree
    /// while iterating.
    pub fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id).children.clone()
    }

    /// The `i`-th child. Panics if out of range; transforms rely on the
    /// fixed child shapes documented on [`NodeKind`].
    pub fn child(&self, id: NodeId, i: usize) -> NodeId {
        self.node(id).children[i]
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).last_child()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = &self.node(parent).children;
        let pos = self.index_of_child(parent, id);
        siblings.get(pos + 1).copied()
    }

    fn index_of_child(&self, parent: NodeId, child: NodeId) -> usize {
        self.node(parent)
            .children
            .iter()
            .position(|&c| c == child)
            .expect("node is not a child of its parent")
    }

    // ------------------------------------------------------------------
    // Structure mutation
    // ------------------------------------------------------------------

    fn assert_detached(&self, id: NodeId) {
        assert!(
            self.node(id).parent.is_none(),
            "node must be detached before it can be attached"
        );
    }

    pub fn add_child_to_back(&mut self, parent: NodeId, child: NodeId) {
        self.assert_detached(child);
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
    }

    pub fn add_child_to_front(&mut self, parent: NodeId, child: NodeId) {
        self.assert_detached(child);
        self.node_mut(parent).children.insert(0, child);
        self.node_mut(child).parent = Some(parent);
    }

    /// Insert `new_child` immediately before `existing` under the same parent.
    pub fn add_child_before(&mut self, new_child: NodeId, existing: NodeId) {
        self.assert_detached(new_child);
        let parent = self.parent(existing).expect("existing node has no parent");
        let pos = self.index_of_child(parent, existing);
        self.node_mut(parent).children.insert(pos, new_child);
        self.node_mut(new_child).parent = Some(parent);
    }

    /// Insert `new_child` immediately after `existing` under the same parent.
    pub fn add_child_after(&mut self, new_child: NodeId, existing: NodeId) {
        self.assert_detached(new_child);
        let parent = self.parent(existing).expect("existing node has no parent");
        let pos = self.index_of_child(parent, existing);
        self.node_mut(parent).children.insert(pos + 1, new_child);
        self.node_mut(new_child).parent = Some(parent);
    }

    /// Detach a node from its parent. Panics on a node with no parent.
    pub fn detach(&mut self, id: NodeId) -> NodeId {
        let parent = self.parent(id).expect("cannot detach a root node");
        let pos = self.index_of_child(parent, id);
        self.node_mut(parent).children.remove(pos);
        self.node_mut(id).parent = None;
        id
    }

    /// Detach and return the first child, if any.
    pub fn remove_first_child(&mut self, id: NodeId) -> Option<NodeId> {
        let first = self.first_child(id)?;
        Some(self.detach(first))
    }

    /// Replace `old` with `new_child` in `old`'s position under `parent`.
    /// `old` is left detached.
    pub fn replace_child(&mut self, parent: NodeId, old: NodeId, new_child: NodeId) {
        self.assert_detached(new_child);
        let pos = self.index_of_child(parent, old);
        self.node_mut(parent).children[pos] = new_child;
        self.node_mut(old).parent = None;
        self.node_mut(new_child).parent = Some(parent);
    }

    // ------------------------------------------------------------------
    // Cloning and source info
    // ------------------------------------------------------------------

    /// Shallow copy: payloads, flags, source info and JSDoc, no children.
    pub fn clone_node(&mut self, id: NodeId) -> NodeId {
        let mut copy = self.node(id).clone();
        copy.children = Vec::new();
        copy.parent = None;
        let new_id = NodeId(self.nodes.len() as u32);
        self.nodes.push(copy);
        new_id
    }

    /// Deep copy of a subtree. The copy is freshly owned (detached) and
    /// retains the originals' source info.
    pub fn clone_tree(&mut self, id: NodeId) -> NodeId {
        let copy = self.clone_node(id);
        for child in self.child_ids(id) {
            let child_copy = self.clone_tree(child);
            self.add_child_to_back(copy, child_copy);
        }
        copy
    }

    /// Copy `src`'s source info onto `dst` (single node).
    pub fn copy_information_from(&mut self, dst: NodeId, src: NodeId) {
        let info = self.node(src).source.clone();
        self.node_mut(dst).source = info;
    }

    /// Fill `donor`'s source info into every node of the `root` subtree
    /// that lacks one. Nodes that already carry info keep it.
    pub fn use_source_info_if_missing_from_tree(&mut self, root: NodeId, donor: NodeId) {
        let info = self.node(donor).source.clone();
        let Some(info) = info else {
            return;
        };
        self.fill_source_info(root, &info);
    }

    fn fill_source_info(&mut self, id: NodeId, info: &SourceInfo) {
        if self.node(id).source.is_none() {
            self.node_mut(id).source = Some(info.clone());
        }
        for child in self.child_ids(id) {
            self.fill_source_info(child, info);
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// The dotted name a node denotes, if it is a qualified name:
    /// an identifier, `this`, or a chain of property accesses over one.
    pub fn qualified_name(&self, id: NodeId) -> Option<String> {
        let node = self.node(id);
        match node.kind {
            NodeKind::Name if !node.string.is_empty() => Some(node.string.clone()),
            NodeKind::This => Some("this".to_string()),
            NodeKind::GetProp => {
                let owner = self.qualified_name(node.children[0])?;
                let prop = &self.node(node.children[1]).string;
                Some(format!("{owner}.{prop}"))
            }
            _ => None,
        }
    }

    pub fn is_qualified_name(&self, id: NodeId) -> bool {
        self.qualified_name(id).is_some()
    }

    pub fn matches_qualified_name(&self, a: NodeId, b: NodeId) -> bool {
        match (self.qualified_name(a), self.qualified_name(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// Whether the node sits in a statement position.
    pub fn is_statement(&self, id: NodeId) -> bool {
        match self.parent(id) {
            Some(p) => matches!(self.kind(p), NodeKind::Script | NodeKind::Block),
            None => false,
        }
    }

    /// Nearest enclosing node in statement position, the node itself
    /// included. Panics if there is none; callers only ask inside scripts.
    pub fn enclosing_statement(&self, id: NodeId) -> NodeId {
        let mut cur = id;
        while !self.is_statement(cur) {
            cur = self
                .parent(cur)
                .expect("node is not inside a statement");
        }
        cur
    }

    pub fn enclosing_function(&self, id: NodeId) -> Option<NodeId> {
        let mut cur = self.parent(id)?;
        loop {
            if self.kind(cur) == NodeKind::Function {
                return Some(cur);
            }
            cur = self.parent(cur)?;
        }
    }

    pub fn is_in_function(&self, id: NodeId) -> bool {
        self.enclosing_function(id).is_some()
    }

    /// Conservative side-effect analysis: a node may have side effects
    /// unless it is built purely from names, literals and accesses.
    pub fn may_have_side_effects(&self, id: NodeId) -> bool {
        let node = self.node(id);
        match node.kind {
            NodeKind::Name
            | NodeKind::Number
            | NodeKind::String
            | NodeKind::This
            | NodeKind::True
            | NodeKind::False
            | NodeKind::Null
            | NodeKind::Empty => false,
            NodeKind::GetProp
            | NodeKind::GetElem
            | NodeKind::ArrayLit
            | NodeKind::ObjectLit
            | NodeKind::StringKey
            | NodeKind::Comma
            | NodeKind::Not
            | NodeKind::Lt
            | NodeKind::Sub
            | NodeKind::Spread => node
                .children
                .iter()
                .any(|&c| self.may_have_side_effects(c)),
            _ => true,
        }
    }

    /// Whether the node's body references `this`. For a function node the
    /// search starts at its body; nested functions are not descended into.
    pub fn references_this(&self, id: NodeId) -> bool {
        let start = if self.kind(id) == NodeKind::Function {
            self.child(id, 2)
        } else {
            id
        };
        self.contains_this(start)
    }

    fn contains_this(&self, id: NodeId) -> bool {
        if self.kind(id) == NodeKind::This {
            return true;
        }
        self.node(id)
            .children
            .iter()
            .any(|&c| self.kind(c) != NodeKind::Function && self.contains_this(c))
    }

    /// First string-key child of an object literal with the given key.
    /// Returns the key's value child.
    pub fn first_prop_matching_key(&self, objlit: NodeId, key: &str) -> Option<NodeId> {
        for &child in self.children(objlit) {
            let node = self.node(child);
            if node.kind == NodeKind::StringKey && node.string == key {
                return node.first_child();
            }
        }
        None
    }

    /// The JSDoc closest to a node: its own, or the one attached to the
    /// enclosing name declarator, declaration statement or assignment.
    pub fn best_jsdoc(&self, id: NodeId) -> Option<&JsDoc> {
        if let Some(doc) = &self.node(id).jsdoc {
            return Some(doc);
        }
        let mut cur = id;
        while let Some(parent) = self.parent(cur) {
            match self.kind(parent) {
                NodeKind::Name | NodeKind::Assign | NodeKind::ExprResult => {}
                k if k.is_name_declaration() => {}
                _ => return None,
            }
            if let Some(doc) = &self.node(parent).jsdoc {
                return Some(doc);
            }
            cur = parent;
        }
        None
    }

    // ------------------------------------------------------------------
    // Factory
    // ------------------------------------------------------------------

    pub fn name(&mut self, text: &str) -> NodeId {
        let id = self.alloc(NodeKind::Name);
        self.node_mut(id).string = text.to_string();
        id
    }

    pub fn string_lit(&mut self, text: &str) -> NodeId {
        let id = self.alloc(NodeKind::String);
        self.node_mut(id).string = text.to_string();
        id
    }

    pub fn number(&mut self, value: f64) -> NodeId {
        let id = self.alloc(NodeKind::Number);
        self.node_mut(id).double = value;
        id
    }

    pub fn this_node(&mut self) -> NodeId {
        self.alloc(NodeKind::This)
    }

    pub fn true_node(&mut self) -> NodeId {
        self.alloc(NodeKind::True)
    }

    pub fn null_node(&mut self) -> NodeId {
        self.alloc(NodeKind::Null)
    }

    pub fn empty(&mut self) -> NodeId {
        self.alloc(NodeKind::Empty)
    }

    /// `key: value` object-literal entry.
    pub fn string_key(&mut self, key: &str, value: NodeId) -> NodeId {
        let id = self.string_key_shorthand(key);
        self.add_child_to_back(id, value);
        id
    }

    /// Shorthand `{ key }` entry: a string key with no value child.
    pub fn string_key_shorthand(&mut self, key: &str) -> NodeId {
        let id = self.alloc(NodeKind::StringKey);
        self.node_mut(id).string = key.to_string();
        id
    }

    pub fn getprop(&mut self, object: NodeId, prop: &str) -> NodeId {
        let id = self.alloc(NodeKind::GetProp);
        let prop_node = self.string_lit(prop);
        self.add_child_to_back(id, object);
        self.add_child_to_back(id, prop_node);
        id
    }

    pub fn getelem(&mut self, object: NodeId, index: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::GetElem);
        self.add_child_to_back(id, object);
        self.add_child_to_back(id, index);
        id
    }

    pub fn call(&mut self, callee: NodeId, args: Vec<NodeId>) -> NodeId {
        let id = self.alloc(NodeKind::Call);
        self.add_child_to_back(id, callee);
        for arg in args {
            self.add_child_to_back(id, arg);
        }
        id
    }

    pub fn new_expr(&mut self, callee: NodeId, args: Vec<NodeId>) -> NodeId {
        let id = self.alloc(NodeKind::New);
        self.add_child_to_back(id, callee);
        for arg in args {
            self.add_child_to_back(id, arg);
        }
        id
    }

    pub fn assign(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::Assign);
        self.add_child_to_back(id, lhs);
        self.add_child_to_back(id, rhs);
        id
    }

    pub fn comma(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::Comma);
        self.add_child_to_back(id, lhs);
        self.add_child_to_back(id, rhs);
        id
    }

    pub fn not(&mut self, operand: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::Not);
        self.add_child_to_back(id, operand);
        id
    }

    pub fn lt(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::Lt);
        self.add_child_to_back(id, lhs);
        self.add_child_to_back(id, rhs);
        id
    }

    pub fn sub(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::Sub);
        self.add_child_to_back(id, lhs);
        self.add_child_to_back(id, rhs);
        id
    }

    pub fn inc(&mut self, operand: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::Inc);
        self.add_child_to_back(id, operand);
        id
    }

    pub fn arraylit(&mut self, elements: Vec<NodeId>) -> NodeId {
        let id = self.alloc(NodeKind::ArrayLit);
        for e in elements {
            self.add_child_to_back(id, e);
        }
        id
    }

    pub fn objectlit(&mut self, entries: Vec<NodeId>) -> NodeId {
        let id = self.alloc(NodeKind::ObjectLit);
        for e in entries {
            self.add_child_to_back(id, e);
        }
        id
    }

    pub fn block(&mut self, statements: Vec<NodeId>) -> NodeId {
        let id = self.alloc(NodeKind::Block);
        for s in statements {
            self.add_child_to_back(id, s);
        }
        id
    }

    pub fn script(&mut self, statements: Vec<NodeId>) -> NodeId {
        let id = self.alloc(NodeKind::Script);
        for s in statements {
            self.add_child_to_back(id, s);
        }
        id
    }

    pub fn expr_result(&mut self, expr: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::ExprResult);
        self.add_child_to_back(id, expr);
        id
    }

    pub fn return_node(&mut self, expr: Option<NodeId>) -> NodeId {
        let id = self.alloc(NodeKind::Return);
        if let Some(expr) = expr {
            self.add_child_to_back(id, expr);
        }
        id
    }

    /// `var name = value;` — a declaration with a single declarator.
    pub fn var_decl(&mut self, name: NodeId, value: Option<NodeId>) -> NodeId {
        self.name_declaration(NodeKind::Var, name, value)
    }

    pub fn let_decl(&mut self, name: NodeId, value: Option<NodeId>) -> NodeId {
        self.name_declaration(NodeKind::Let, name, value)
    }

    /// A declaration statement of the given kind (`Var`, `Let` or `Const`)
    /// with a single declarator.
    pub fn declaration(&mut self, kind: NodeKind, name: NodeId, value: Option<NodeId>) -> NodeId {
        assert!(kind.is_name_declaration());
        self.name_declaration(kind, name, value)
    }

    fn name_declaration(
        &mut self,
        kind: NodeKind,
        name: NodeId,
        value: Option<NodeId>,
    ) -> NodeId {
        debug_assert_eq!(self.kind(name), NodeKind::Name);
        let id = self.alloc(kind);
        if let Some(value) = value {
            self.add_child_to_back(name, value);
        }
        self.add_child_to_back(id, name);
        id
    }

    pub fn for_loop(&mut self, init: NodeId, cond: NodeId, incr: NodeId, body: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::For);
        self.add_child_to_back(id, init);
        self.add_child_to_back(id, cond);
        self.add_child_to_back(id, incr);
        self.add_child_to_back(id, body);
        id
    }

    pub fn for_of(&mut self, target: NodeId, iterable: NodeId, body: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::ForOf);
        self.add_child_to_back(id, target);
        self.add_child_to_back(id, iterable);
        self.add_child_to_back(id, body);
        id
    }

    pub fn function(&mut self, name: NodeId, params: NodeId, body: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::Function);
        self.add_child_to_back(id, name);
        self.add_child_to_back(id, params);
        self.add_child_to_back(id, body);
        id
    }

    pub fn param_list(&mut self, params: Vec<NodeId>) -> NodeId {
        let id = self.alloc(NodeKind::ParamList);
        for p in params {
            self.add_child_to_back(id, p);
        }
        id
    }

    pub fn spread(&mut self, expr: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::Spread);
        self.add_child_to_back(id, expr);
        id
    }

    pub fn rest(&mut self, name: &str) -> NodeId {
        let id = self.alloc(NodeKind::Rest);
        self.node_mut(id).string = name.to_string();
        id
    }

    pub fn member_function_def(&mut self, name: &str, function: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::MemberFunctionDef);
        self.node_mut(id).string = name.to_string();
        self.add_child_to_back(id, function);
        id
    }

    pub fn getter_def(&mut self, name: &str, function: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::GetterDef);
        self.node_mut(id).string = name.to_string();
        self.add_child_to_back(id, function);
        id
    }

    pub fn setter_def(&mut self, name: &str, function: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::SetterDef);
        self.node_mut(id).string = name.to_string();
        self.add_child_to_back(id, function);
        id
    }

    pub fn computed_prop(&mut self, key: NodeId, value: NodeId) -> NodeId {
        let id = self.alloc(NodeKind::ComputedProp);
        self.add_child_to_back(id, key);
        self.add_child_to_back(id, value);
        id
    }

    pub fn class_node(&mut self, name: NodeId, superclass: NodeId, members: NodeId) -> NodeId {
        debug_assert_eq!(self.kind(members), NodeKind::ClassMembers);
        let id = self.alloc(NodeKind::Class);
        self.add_child_to_back(id, name);
        self.add_child_to_back(id, superclass);
        self.add_child_to_back(id, members);
        id
    }

    pub fn class_members(&mut self, members: Vec<NodeId>) -> NodeId {
        let id = self.alloc(NodeKind::ClassMembers);
        for m in members {
            self.add_child_to_back(id, m);
        }
        id
    }

    /// Build a property-access chain for a dotted name like `a.b.c`.
    pub fn new_qname(&mut self, qualified: &str) -> NodeId {
        let mut parts = qualified.split('.');
        let first = parts.next().expect("qualified name must be non-empty");
        let mut node = if first == "this" {
            self.this_node()
        } else {
            self.name(first)
        };
        for part in parts {
            node = self.getprop(node, part);
        }
        node
    }
}
