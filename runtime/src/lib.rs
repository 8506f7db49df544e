//! kubsh: an interactive shell with a boot sector inspector and a VFS
//! directory mirror of system accounts.

pub mod config;
pub mod history;
pub mod interactive;
pub mod logger;
pub mod shell;
pub mod signals;
pub mod vfs;

pub use config::Config;
pub use interactive::{Flow, Shell};
