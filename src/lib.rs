//! prjgraph core library.
//!
//! This library resolves declarative C++ project descriptors into ordered
//! build plans. It provides the descriptor schema and loader, the target
//! registry and its cycle-aware planner, renderers for plans and graphs,
//! and the command line interface definitions used by the `prjgraph`
//! binary.

pub mod ast;
pub mod cli;
pub mod diagnostics;
pub mod hasher;
pub mod manifest;
pub mod plan_gen;
pub mod resolver;
pub mod runner;
pub mod target;
