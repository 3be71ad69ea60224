//! ES6 down-leveling rewriters
//!
//! One module per lowered construct, dispatched by the pass driver in
//! [`es6_to_es5`]. Each rewriter is a local, single-shot transformation on
//! a matched node: it either installs a fully lowered replacement and
//! reports a code change, or emits a diagnostic and leaves the node in
//! place for later passes to treat as best-effort.

pub mod class_es5;
pub mod es6_to_es5;
pub mod for_of_es5;
pub mod object_literals_es5;
pub mod rest_params_es5;
pub mod spread_es5;
