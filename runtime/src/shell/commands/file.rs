//! Directory commands under the VFS root: mkdir, rmdir, ls

use runtime_macros::shell_commands;
use std::io;
use std::path::Path;

use super::{CommandContext, Intercept};
use crate::vfs::{ensure_dir, VfsPath};

/// Directory commands that redirect VFS paths to the user mirror.
pub struct FileCommands;

#[shell_commands]
impl FileCommands {
    /// mkdir - create a VFS user, or a plain directory deeper in the tree
    #[shell_command(
        name = "mkdir",
        description = "Create a VFS user directory (and the account behind it)"
    )]
    fn cmd_mkdir(args: &[&str], ctx: &mut CommandContext<'_>) -> io::Result<Intercept> {
        let Some(target) = args.get(1) else {
            return Ok(Intercept::PassThrough);
        };
        match ctx.vfs.locate(Path::new(target)) {
            VfsPath::User(name) => match ctx.vfs.create_user(name) {
                Ok(_) => writeln!(ctx.out, "Created VFS directory for user: {}", name)?,
                Err(e) => {
                    log::warn!("{}", e);
                    writeln!(ctx.out, "mkdir: cannot create directory '{}'", target)?;
                }
            },
            VfsPath::Root | VfsPath::Nested => {
                if let Err(e) = ensure_dir(Path::new(target)) {
                    log::warn!("mkdir {}: {}", target, e);
                    writeln!(ctx.out, "mkdir: cannot create directory '{}'", target)?;
                }
            }
            VfsPath::Outside => return Ok(Intercept::PassThrough),
        }
        Ok(Intercept::Handled)
    }

    /// rmdir - remove a VFS user, or an empty directory deeper in the tree
    #[shell_command(
        name = "rmdir",
        description = "Remove a VFS user directory (and the account behind it)"
    )]
    fn cmd_rmdir(args: &[&str], ctx: &mut CommandContext<'_>) -> io::Result<Intercept> {
        let Some(target) = args.get(1) else {
            return Ok(Intercept::PassThrough);
        };
        match ctx.vfs.locate(Path::new(target)) {
            VfsPath::User(name) => match ctx.vfs.remove_user(name) {
                Ok(()) => writeln!(ctx.out, "Removed VFS directory and user: {}", name)?,
                Err(e) => {
                    log::warn!("{}", e);
                    writeln!(ctx.out, "rmdir: failed to remove '{}'", target)?;
                }
            },
            VfsPath::Root | VfsPath::Nested => {
                if let Err(e) = std::fs::remove_dir(target) {
                    log::warn!("rmdir {}: {}", target, e);
                    writeln!(ctx.out, "rmdir: failed to remove '{}'", target)?;
                }
            }
            VfsPath::Outside => return Ok(Intercept::PassThrough),
        }
        Ok(Intercept::Handled)
    }

    /// ls - list VFS users
    #[shell_command(name = "ls", description = "List VFS users when given the VFS root")]
    fn cmd_ls(args: &[&str], ctx: &mut CommandContext<'_>) -> io::Result<Intercept> {
        let Some(target) = args.get(1) else {
            return Ok(Intercept::PassThrough);
        };
        if ctx.vfs.locate(Path::new(target)) != VfsPath::Root {
            return Ok(Intercept::PassThrough);
        }

        match ctx.vfs.list_users() {
            Ok(names) => {
                for name in names {
                    writeln!(ctx.out, "{}", name)?;
                }
            }
            Err(e) => {
                log::debug!("ls {}: {}", target, e);
                writeln!(
                    ctx.out,
                    "ls: cannot access '{}': No such file or directory",
                    target
                )?;
            }
        }
        Ok(Intercept::Handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::{NoopProvisioner, VfsUsers};

    fn vfs_in(dir: &Path) -> VfsUsers {
        let passwd = dir.join("passwd");
        std::fs::write(&passwd, "alice:x:1001:1001::/home/alice:/bin/bash\n").unwrap();
        VfsUsers::new(dir.join("users"), passwd, Box::new(NoopProvisioner))
    }

    fn call(f: crate::shell::commands::CommandFn, vfs: &VfsUsers, args: &[&str]) -> (Intercept, String) {
        let mut out = Vec::new();
        let mut ctx = CommandContext {
            vfs,
            out: &mut out,
        };
        let intercept = f(args, &mut ctx).unwrap();
        (intercept, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_mkdir_user_twice() {
        let dir = tempfile::tempdir().unwrap();
        let vfs = vfs_in(dir.path());
        let target = dir.path().join("users/alice");
        let target = target.to_str().unwrap();

        for _ in 0..2 {
            let (intercept, out) = call(FileCommands::cmd_mkdir, &vfs, &["mkdir", target]);
            assert_eq!(intercept, Intercept::Handled);
            assert_eq!(out, "Created VFS directory for user: alice\n");
        }
        assert_eq!(
            std::fs::read_to_string(dir.path().join("users/alice/id")).unwrap(),
            "1001\n"
        );
    }

    #[test]
    fn test_mkdir_nested_and_outside() {
        let dir = tempfile::tempdir().unwrap();
        let vfs = vfs_in(dir.path());
        let nested = dir.path().join("users/alice/notes/2024");
        let (intercept, out) =
            call(FileCommands::cmd_mkdir, &vfs, &["mkdir", nested.to_str().unwrap()]);
        assert_eq!(intercept, Intercept::Handled);
        assert_eq!(out, "");
        assert!(nested.is_dir());

        let outside = dir.path().join("elsewhere");
        let (intercept, _) =
            call(FileCommands::cmd_mkdir, &vfs, &["mkdir", outside.to_str().unwrap()]);
        assert_eq!(intercept, Intercept::PassThrough);
        assert!(!outside.exists());

        let (intercept, _) = call(FileCommands::cmd_mkdir, &vfs, &["mkdir"]);
        assert_eq!(intercept, Intercept::PassThrough);
    }

    #[test]
    fn test_rmdir_user() {
        let dir = tempfile::tempdir().unwrap();
        let vfs = vfs_in(dir.path());
        vfs.create_user("bob").unwrap();
        let target = dir.path().join("users/bob");

        let (intercept, out) =
            call(FileCommands::cmd_rmdir, &vfs, &["rmdir", target.to_str().unwrap()]);
        assert_eq!(intercept, Intercept::Handled);
        assert_eq!(out, "Removed VFS directory and user: bob\n");
        assert!(!target.exists());
    }

    #[test]
    fn test_ls_root() {
        let dir = tempfile::tempdir().unwrap();
        let vfs = vfs_in(dir.path());
        let root = dir.path().join("users");
        let root = root.to_str().unwrap();

        let (intercept, out) = call(FileCommands::cmd_ls, &vfs, &["ls", root]);
        assert_eq!(intercept, Intercept::Handled);
        assert_eq!(
            out,
            format!("ls: cannot access '{}': No such file or directory\n", root)
        );

        vfs.create_user("zed").unwrap();
        vfs.create_user("alice").unwrap();
        let (_, out) = call(FileCommands::cmd_ls, &vfs, &["ls", root]);
        assert_eq!(out, "alice\nzed\n");

        let (intercept, _) = call(FileCommands::cmd_ls, &vfs, &["ls", "/"]);
        assert_eq!(intercept, Intercept::PassThrough);
        let (intercept, _) = call(FileCommands::cmd_ls, &vfs, &["ls"]);
        assert_eq!(intercept, Intercept::PassThrough);
    }
}
