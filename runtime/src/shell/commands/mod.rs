//! Builtin command implementations.
//!
//! Line-level builtins (`history`, `\l`, `\e`, `debug`, `echo`) are plain
//! functions called by the dispatcher. Word-level builtins that shadow
//! external programs for VFS paths (`mkdir`, `rmdir`, `ls`, `cat`) are
//! registered with `#[shell_commands]` and may decline a call, in which case
//! the line runs as an external command.

mod account;
pub mod core;
pub mod disk;
pub mod env;
mod file;

pub use self::account::AccountCommands;
pub use self::file::FileCommands;

use std::io::{self, Write};

use crate::vfs::VfsUsers;

/// Whether a builtin handled the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intercept {
    Handled,
    /// Not a VFS path; run the external program instead.
    PassThrough,
}

/// State a word-level builtin may use.
pub struct CommandContext<'a> {
    pub vfs: &'a VfsUsers,
    pub out: &'a mut dyn Write,
}

/// Builtin function type.
/// Takes the full argument vector (name first) and the command context.
pub type CommandFn = fn(args: &[&str], ctx: &mut CommandContext<'_>) -> io::Result<Intercept>;

/// Unified builtin interface.
///
/// This struct provides a single entry point to look up builtins across the
/// category modules.
pub struct ShellCommands;

impl ShellCommands {
    pub fn get_command(name: &str) -> Option<CommandFn> {
        FileCommands::get_command(name).or_else(|| AccountCommands::get_command(name))
    }

    pub fn list_commands() -> Vec<(&'static str, &'static str)> {
        let mut cmds = Vec::new();
        cmds.extend_from_slice(FileCommands::list_commands());
        cmds.extend_from_slice(AccountCommands::list_commands());
        cmds.sort();
        cmds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_command() {
        assert!(ShellCommands::get_command("mkdir").is_some());
        assert!(ShellCommands::get_command("rmdir").is_some());
        assert!(ShellCommands::get_command("ls").is_some());
        assert!(ShellCommands::get_command("cat").is_some());
        assert!(ShellCommands::get_command("echo").is_none());
        assert!(ShellCommands::get_command("nonexistent").is_none());
    }

    #[test]
    fn test_list_commands() {
        let names: Vec<&str> = ShellCommands::list_commands()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, ["cat", "ls", "mkdir", "rmdir"]);
        assert!(ShellCommands::list_commands()
            .iter()
            .all(|(_, description)| !description.is_empty()));
    }
}
