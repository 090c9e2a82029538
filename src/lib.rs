//! Carve core library.
//!
//! Turns a manifest describing components of a large native source tree into
//! a Ninja build file, so that a slice of the tree can be built without its
//! native build system.

pub mod ast;
pub mod cli;
pub mod ir;
pub mod manifest;
pub mod ninja_gen;
pub mod runner;
