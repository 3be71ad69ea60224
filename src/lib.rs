//! jslower — an ES6 to ES5/ES3 down-leveling pass.
//!
//! The crate rewrites an already-parsed abstract syntax tree in place so
//! that it uses only constructs available in the older dialect plus two
//! fixed runtime helpers (`$jscomp.inherits`, `$jscomp.makeIterator`).
//! Six constructs are lowered:
//!
//! - `class` declarations and expressions
//! - `for ... of` iteration
//! - rest parameters
//! - spread elements in array literals, calls and `new`
//! - computed property keys in object literals
//! - object-literal shorthand properties and methods
//!
//! Arrow functions, default parameters, destructuring, modules,
//! generators, block scoping and template literals are the business of
//! sibling passes and pass through untouched.
//!
//! # Example
//!
//! ```
//! use jslower::ast::AstArena;
//! use jslower::context::CompilerContext;
//! use jslower::transforms::es6_to_es5::Es6ToEs5;
//!
//! let mut arena = AstArena::new();
//! // for (x of arr) {}
//! let x = arena.name("x");
//! let arr = arena.name("arr");
//! let body = arena.block(vec![]);
//! let loop_node = arena.for_of(x, arr, body);
//! let root = arena.script(vec![loop_node]);
//!
//! let mut ctx = CompilerContext::default();
//! Es6ToEs5::new().process(&mut arena, &mut ctx, None, root);
//!
//! assert!(ctx.needs_runtime);
//! assert!(jslower::printer::print(&arena, root).contains("$jscomp.makeIterator"));
//! ```

pub mod ast;
pub mod common;
pub mod context;
pub mod diagnostics;
pub mod printer;
pub mod runtime;
pub mod transforms;
pub mod traversal;
