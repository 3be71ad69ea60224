//! Compact code rendering.
//!
//! Renders the node shapes this pass consumes and emits into a canonical,
//! whitespace-free form. It exists for tests and debug output, not as a
//! general pretty-printer; an unknown shape is a panic, which is the
//! right behavior for a fixed-format renderer driven by a closed kind set.

use crate::ast::{AstArena, NodeId, NodeKind};

/// Render a subtree. Statement-like roots render as statements, anything
/// else as an expression.
pub fn print(arena: &AstArena, id: NodeId) -> String {
    let mut p = Printer {
        arena,
        out: String::new(),
    };
    match arena.kind(id) {
        NodeKind::Script => {
            for child in arena.children(id) {
                p.statement(*child);
            }
        }
        k if is_statement_kind(k) => p.statement(id),
        _ => p.expr(id),
    }
    p.out
}

fn is_statement_kind(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Var
            | NodeKind::Let
            | NodeKind::Const
            | NodeKind::ExprResult
            | NodeKind::Block
            | NodeKind::For
            | NodeKind::ForOf
            | NodeKind::Return
            | NodeKind::Empty
    )
}

struct Printer<'a> {
    arena: &'a AstArena,
    out: String,
}

impl<'a> Printer<'a> {
    fn statement(&mut self, id: NodeId) {
        match self.arena.kind(id) {
            NodeKind::Var | NodeKind::Let | NodeKind::Const => {
                self.declaration(id);
                self.out.push(';');
            }
            NodeKind::ExprResult => {
                self.expr(self.arena.child(id, 0));
                self.out.push(';');
            }
            NodeKind::Block => {
                self.out.push('{');
                for child in self.arena.children(id) {
                    self.statement(*child);
                }
                self.out.push('}');
            }
            NodeKind::For => {
                self.out.push_str("for(");
                let init = self.arena.child(id, 0);
                match self.arena.kind(init) {
                    NodeKind::Var | NodeKind::Let | NodeKind::Const => self.declaration(init),
                    NodeKind::Empty => {}
                    _ => self.expr(init),
                }
                self.out.push(';');
                self.expr(self.arena.child(id, 1));
                self.out.push(';');
                self.expr(self.arena.child(id, 2));
                self.out.push(')');
                self.statement(self.arena.child(id, 3));
            }
            NodeKind::ForOf => {
                self.out.push_str("for(");
                let target = self.arena.child(id, 0);
                match self.arena.kind(target) {
                    NodeKind::Var | NodeKind::Let | NodeKind::Const => self.declaration(target),
                    _ => self.expr(target),
                }
                self.out.push_str(" of ");
                self.expr(self.arena.child(id, 1));
                self.out.push(')');
                self.statement(self.arena.child(id, 2));
            }
            NodeKind::Return => {
                self.out.push_str("return");
                if let Some(expr) = self.arena.first_child(id) {
                    self.out.push(' ');
                    self.expr(expr);
                }
                self.out.push(';');
            }
            NodeKind::Function => {
                self.function(id);
            }
            NodeKind::Empty => self.out.push(';'),
            kind => panic!("cannot render {kind:?} as a statement"),
        }
    }

    /// `var a=1,b` without the trailing semicolon, for reuse in `for` heads.
    fn declaration(&mut self, id: NodeId) {
        self.out.push_str(match self.arena.kind(id) {
            NodeKind::Var => "var ",
            NodeKind::Let => "let ",
            NodeKind::Const => "const ",
            kind => panic!("not a declaration: {kind:?}"),
        });
        let names = self.arena.child_ids(id);
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.out.push_str(&self.arena.node(*name).string);
            if let Some(init) = self.arena.first_child(*name) {
                self.out.push('=');
                self.expr(init);
            }
        }
    }

    fn expr(&mut self, id: NodeId) {
        let node = self.arena.node(id);
        match node.kind {
            NodeKind::Name => self.out.push_str(&node.string),
            NodeKind::Number => self.number(node.double),
            NodeKind::String => {
                self.out.push('"');
                self.escaped(&node.string);
                self.out.push('"');
            }
            NodeKind::This => self.out.push_str("this"),
            NodeKind::True => self.out.push_str("true"),
            NodeKind::False => self.out.push_str("false"),
            NodeKind::Null => self.out.push_str("null"),
            NodeKind::GetProp => {
                self.operand(self.arena.child(id, 0));
                self.out.push('.');
                let prop = self.arena.child(id, 1);
                self.out.push_str(&self.arena.node(prop).string);
            }
            NodeKind::GetElem => {
                self.operand(self.arena.child(id, 0));
                self.out.push('[');
                self.expr(self.arena.child(id, 1));
                self.out.push(']');
            }
            NodeKind::Call => {
                self.operand(self.arena.child(id, 0));
                self.arg_list(id, 1);
            }
            NodeKind::New => {
                self.out.push_str("new ");
                let callee = self.arena.child(id, 0);
                if self.arena.kind(callee) == NodeKind::Name {
                    self.expr(callee);
                } else {
                    self.out.push('(');
                    self.expr(callee);
                    self.out.push(')');
                }
                self.arg_list(id, 1);
            }
            NodeKind::Assign => {
                self.expr(self.arena.child(id, 0));
                self.out.push('=');
                self.operand(self.arena.child(id, 1));
            }
            NodeKind::Comma => {
                self.out.push('(');
                self.comma_chain(id);
                self.out.push(')');
            }
            NodeKind::Not => {
                self.out.push('!');
                self.operand(self.arena.child(id, 0));
            }
            NodeKind::Lt => {
                self.operand(self.arena.child(id, 0));
                self.out.push('<');
                self.operand(self.arena.child(id, 1));
            }
            NodeKind::Sub => {
                self.operand(self.arena.child(id, 0));
                self.out.push('-');
                self.operand(self.arena.child(id, 1));
            }
            NodeKind::Inc => {
                self.out.push_str("++");
                self.expr(self.arena.child(id, 0));
            }
            NodeKind::ArrayLit => {
                self.out.push('[');
                let elems = self.arena.child_ids(id);
                for (i, e) in elems.iter().enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    self.expr(*e);
                }
                self.out.push(']');
            }
            NodeKind::ObjectLit => {
                self.out.push('{');
                let entries = self.arena.child_ids(id);
                for (i, e) in entries.iter().enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    self.objectlit_entry(*e);
                }
                self.out.push('}');
            }
            NodeKind::Function => self.function(id),
            NodeKind::Spread => {
                self.out.push_str("...");
                self.expr(self.arena.child(id, 0));
            }
            NodeKind::Empty => {}
            kind => panic!("cannot render {kind:?} as an expression"),
        }
    }

    /// An operand that must bind tighter than its surroundings.
    fn operand(&mut self, id: NodeId) {
        if matches!(self.arena.kind(id), NodeKind::Assign) {
            self.out.push('(');
            self.expr(id);
            self.out.push(')');
        } else {
            self.expr(id);
        }
    }

    fn comma_chain(&mut self, id: NodeId) {
        let lhs = self.arena.child(id, 0);
        let rhs = self.arena.child(id, 1);
        if self.arena.kind(lhs) == NodeKind::Comma {
            self.comma_chain(lhs);
        } else {
            self.expr(lhs);
        }
        self.out.push(',');
        if self.arena.kind(rhs) == NodeKind::Comma {
            self.comma_chain(rhs);
        } else {
            self.expr(rhs);
        }
    }

    fn arg_list(&mut self, id: NodeId, from: usize) {
        self.out.push('(');
        let children = self.arena.child_ids(id);
        for (i, arg) in children[from..].iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.expr(*arg);
        }
        self.out.push(')');
    }

    fn objectlit_entry(&mut self, id: NodeId) {
        let node = self.arena.node(id);
        match node.kind {
            NodeKind::StringKey => {
                if node.quoted_string {
                    self.out.push('"');
                    self.escaped(&node.string);
                    self.out.push('"');
                } else {
                    self.out.push_str(&node.string);
                }
                match self.arena.first_child(id) {
                    Some(value) => {
                        self.out.push(':');
                        self.expr(value);
                    }
                    // Shorthand entries only exist before lowering.
                    None => {}
                }
            }
            NodeKind::GetterDef => {
                self.out.push_str("get ");
                self.accessor_tail(id);
            }
            NodeKind::SetterDef => {
                self.out.push_str("set ");
                self.accessor_tail(id);
            }
            NodeKind::MemberFunctionDef => {
                self.out.push_str(&node.string);
                self.function_tail(self.arena.child(id, 0));
            }
            NodeKind::ComputedProp => {
                self.out.push('[');
                self.expr(self.arena.child(id, 0));
                self.out.push_str("]:");
                self.expr(self.arena.child(id, 1));
            }
            NodeKind::Empty => {}
            kind => panic!("cannot render {kind:?} in an object literal"),
        }
    }

    fn accessor_tail(&mut self, id: NodeId) {
        let name = self.arena.node(id).string.clone();
        self.out.push_str(&name);
        self.function_tail(self.arena.child(id, 0));
    }

    fn function(&mut self, id: NodeId) {
        self.out.push_str("function");
        let name = &self.arena.node(self.arena.child(id, 0)).string;
        if !name.is_empty() {
            self.out.push(' ');
            self.out.push_str(name);
        }
        self.function_tail(id);
    }

    /// Parameter list and body, shared by functions and accessor entries.
    fn function_tail(&mut self, id: NodeId) {
        let params = self.arena.child(id, 1);
        self.out.push('(');
        let param_ids = self.arena.child_ids(params);
        for (i, p) in param_ids.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            if self.arena.kind(*p) == NodeKind::Rest {
                self.out.push_str("...");
            }
            self.out.push_str(&self.arena.node(*p).string);
        }
        self.out.push(')');
        self.statement(self.arena.child(id, 2));
    }

    fn number(&mut self, value: f64) {
        if value.fract() == 0.0 && value.abs() < 9.007_199_254_740_992e15 {
            self.out.push_str(&(value as i64).to_string());
        } else {
            self.out.push_str(&value.to_string());
        }
    }

    fn escaped(&mut self, text: &str) {
        for ch in text.chars() {
            match ch {
                '"' => self.out.push_str("\\\""),
                '\\' => self.out.push_str("\\\\"),
                '\n' => self.out.push_str("\\n"),
                _ => self.out.push(ch),
            }
        }
    }
}
