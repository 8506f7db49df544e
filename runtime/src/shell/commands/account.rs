//! Account database commands: cat

use runtime_macros::shell_commands;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use super::{CommandContext, Intercept};

/// Commands reading the account database behind the VFS mirror.
pub struct AccountCommands;

#[shell_commands]
impl AccountCommands {
    /// cat - print the passwd file
    #[shell_command(name = "cat", description = "Print the account database")]
    fn cmd_cat(args: &[&str], ctx: &mut CommandContext<'_>) -> io::Result<Intercept> {
        let Some(target) = args.get(1) else {
            return Ok(Intercept::PassThrough);
        };
        if Path::new(target) != ctx.vfs.passwd_file() {
            return Ok(Intercept::PassThrough);
        }

        match std::fs::File::open(target) {
            Ok(file) => {
                for line in BufReader::new(file).lines() {
                    writeln!(ctx.out, "{}", line?)?;
                }
            }
            Err(e) => {
                log::debug!("cat {}: {}", target, e);
                writeln!(ctx.out, "cat: {}: No such file or directory", target)?;
            }
        }
        Ok(Intercept::Handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::{NoopProvisioner, VfsUsers};

    fn cat(vfs: &VfsUsers, args: &[&str]) -> (Intercept, String) {
        let mut out = Vec::new();
        let mut ctx = CommandContext {
            vfs,
            out: &mut out,
        };
        let intercept = AccountCommands::cmd_cat(args, &mut ctx).unwrap();
        (intercept, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_cat_passwd() {
        let dir = tempfile::tempdir().unwrap();
        let passwd = dir.path().join("passwd");
        std::fs::write(&passwd, "root:x:0:0:root:/root:/bin/bash\nbob:x:2:2::/b:/bin/sh").unwrap();
        let vfs = VfsUsers::new(dir.path().join("users"), &passwd, Box::new(NoopProvisioner));

        let (intercept, out) = cat(&vfs, &["cat", passwd.to_str().unwrap()]);
        assert_eq!(intercept, Intercept::Handled);
        assert_eq!(out, "root:x:0:0:root:/root:/bin/bash\nbob:x:2:2::/b:/bin/sh\n");
    }

    #[test]
    fn test_cat_missing_passwd() {
        let dir = tempfile::tempdir().unwrap();
        let passwd = dir.path().join("passwd");
        let vfs = VfsUsers::new(dir.path().join("users"), &passwd, Box::new(NoopProvisioner));
        let target = passwd.to_str().unwrap();

        let (intercept, out) = cat(&vfs, &["cat", target]);
        assert_eq!(intercept, Intercept::Handled);
        assert_eq!(out, format!("cat: {}: No such file or directory\n", target));
    }

    #[test]
    fn test_cat_other_files_pass_through() {
        let vfs = VfsUsers::new("/opt/users", "/etc/passwd", Box::new(NoopProvisioner));
        assert_eq!(cat(&vfs, &["cat", "/etc/hosts"]).0, Intercept::PassThrough);
        assert_eq!(cat(&vfs, &["cat"]).0, Intercept::PassThrough);
    }
}
