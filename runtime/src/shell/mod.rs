//! Shell module - line classification, builtins and external execution
//!
//! Provides the pieces the read-eval loop dispatches to: a first-match-wins
//! line classifier, the builtin commands, PATH resolution and foreground
//! process execution.

pub mod classify;
pub mod commands;
pub mod executor;
pub mod resolver;

pub use classify::{classify, Line};
pub use executor::{ExitOutcome, SpawnError};
pub use resolver::resolve;
