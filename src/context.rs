//! Per-compilation state shared with the pass.
//!
//! The context is an owned structure with an init/teardown scope equal to
//! one compilation run. It is passed to the pass as a parameter; nothing
//! in this crate reaches for ambient globals.

use crate::ast::{AstArena, NodeId};
use crate::common::LanguageOut;
use crate::diagnostics::{DiagnosticBag, DiagnosticType};

/// Options the pass consults.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompilerOptions {
    pub language_out: LanguageOut,
}

/// Supplies fresh integers for temporary names. Strictly monotonic for
/// the lifetime of the compilation, so temporaries from distinct rewrites
/// never collide.
#[derive(Debug, Default)]
pub struct UniqueIdSupplier {
    next: u32,
}

impl UniqueIdSupplier {
    pub fn get(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// The compiler state a pass runs against.
#[derive(Debug, Default)]
pub struct CompilerContext {
    pub options: CompilerOptions,
    pub diagnostics: DiagnosticBag,
    unique_ids: UniqueIdSupplier,
    /// Set when emitted code references a runtime helper.
    pub needs_runtime: bool,
    code_changed: bool,
}

impl CompilerContext {
    pub fn new(options: CompilerOptions) -> CompilerContext {
        CompilerContext {
            options,
            ..Default::default()
        }
    }

    pub fn next_unique_id(&mut self) -> u32 {
        self.unique_ids.get()
    }

    /// Report a diagnostic keyed to a node. The node's own source info is
    /// used when present.
    pub fn report(
        &mut self,
        ty: &DiagnosticType,
        arena: &AstArena,
        node: NodeId,
        args: &[&str],
    ) {
        let info = arena.node(node).source.clone();
        self.diagnostics.report(ty, info.as_ref(), args);
    }

    /// Signal that a local rewrite mutated the tree. Accumulates until
    /// [`CompilerContext::take_code_changed`] is called.
    pub fn report_code_change(&mut self) {
        self.code_changed = true;
    }

    pub fn code_changed(&self) -> bool {
        self.code_changed
    }

    /// Read and reset the accumulated code-change flag, e.g. between two
    /// runs of the pass.
    pub fn take_code_changed(&mut self) -> bool {
        std::mem::take(&mut self.code_changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_ids_are_monotonic() {
        let mut ctx = CompilerContext::default();
        let a = ctx.next_unique_id();
        let b = ctx.next_unique_id();
        let c = ctx.next_unique_id();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_code_change_accumulates() {
        let mut ctx = CompilerContext::default();
        assert!(!ctx.code_changed());
        ctx.report_code_change();
        ctx.report_code_change();
        assert!(ctx.code_changed());
        assert!(ctx.take_code_changed());
        assert!(!ctx.code_changed());
    }
}
