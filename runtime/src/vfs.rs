//! VFS users: a directory tree mirroring system accounts.
//!
//! Each account with a login shell gets `<root>/<name>/` holding three
//! one-line files: `id`, `home` and `shell`. The mirror is filled from the
//! passwd database at startup and edited through the shell's `mkdir`/`rmdir`
//! builtins, which also ask an [`AccountProvisioner`] to add or delete the
//! real account.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::process::{Command, Stdio};

/// Shells whose accounts are mirrored on startup.
const LOGIN_SHELLS: &[&str] = &["/bin/bash", "/bin/sh"];

const DEFAULT_UID: &str = "1000";
const DEFAULT_SHELL: &str = "/bin/bash";

/// Errors from VFS mirror operations.
#[derive(Debug, thiserror::Error)]
pub enum VfsError {
    #[error("cannot create {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write {}: {source}", path.display())]
    WriteRecord {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot remove {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot read account database {}: {source}", path.display())]
    ReadAccounts {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One passwd record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub name: String,
    pub uid: String,
    pub home: String,
    pub shell: String,
}

impl Account {
    /// Parse a `name:pw:uid:gid:gecos:home:shell` line.
    pub fn parse(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split(':').collect();
        if fields.len() < 7 || fields[0].is_empty() {
            return None;
        }
        Some(Self {
            name: fields[0].to_string(),
            uid: fields[2].to_string(),
            home: fields[5].to_string(),
            shell: fields[6].to_string(),
        })
    }

    fn has_login_shell(&self) -> bool {
        LOGIN_SHELLS.contains(&self.shell.as_str())
    }
}

/// Parse every well-formed record of a passwd file.
pub fn parse_passwd(contents: &str) -> Vec<Account> {
    contents.lines().filter_map(Account::parse).collect()
}

/// Creates and deletes real OS accounts.
pub trait AccountProvisioner {
    fn add_user(&self, name: &str) -> io::Result<()>;
    fn remove_user(&self, name: &str) -> io::Result<()>;
}

/// Provisions accounts with `sudo adduser` / `sudo userdel`.
#[derive(Debug, Default)]
pub struct SystemProvisioner;

impl SystemProvisioner {
    fn run(program: &str, args: &[&str]) -> io::Result<()> {
        let status = Command::new("sudo")
            .arg(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!("{} exited with {}", program, status)))
        }
    }
}

impl AccountProvisioner for SystemProvisioner {
    fn add_user(&self, name: &str) -> io::Result<()> {
        Self::run("adduser", &["--disabled-password", "--gecos", "", name])
    }

    fn remove_user(&self, name: &str) -> io::Result<()> {
        Self::run("userdel", &["-r", name])
    }
}

/// Leaves OS accounts alone.
#[derive(Debug, Default)]
pub struct NoopProvisioner;

impl AccountProvisioner for NoopProvisioner {
    fn add_user(&self, _name: &str) -> io::Result<()> {
        Ok(())
    }

    fn remove_user(&self, _name: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Outcome of [`VfsUsers::create_user`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Created {
    New,
    AlreadyPresent,
}

/// Where a path falls relative to the VFS root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VfsPath<'a> {
    /// The root itself.
    Root,
    /// `<root>/<name>`
    User(&'a str),
    /// Deeper below the root.
    Nested,
    /// Not under the root.
    Outside,
}

/// The mirrored user tree.
pub struct VfsUsers {
    root: PathBuf,
    passwd_file: PathBuf,
    provisioner: Box<dyn AccountProvisioner>,
}

impl VfsUsers {
    pub fn new(
        root: impl Into<PathBuf>,
        passwd_file: impl Into<PathBuf>,
        provisioner: Box<dyn AccountProvisioner>,
    ) -> Self {
        Self {
            root: root.into(),
            passwd_file: passwd_file.into(),
            provisioner,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn passwd_file(&self) -> &Path {
        &self.passwd_file
    }

    /// Classify `path` against the root.
    pub fn locate<'p>(&self, path: &'p Path) -> VfsPath<'p> {
        let Ok(rest) = path.strip_prefix(&self.root) else {
            return VfsPath::Outside;
        };
        let mut components = rest.components();
        match (components.next(), components.next()) {
            (None, _) => VfsPath::Root,
            (Some(Component::Normal(name)), None) => match name.to_str() {
                Some(name) => VfsPath::User(name),
                None => VfsPath::Nested,
            },
            _ => VfsPath::Nested,
        }
    }

    /// Mirror every login-shell account not yet present under the root.
    ///
    /// Returns how many user directories were created.
    pub fn sync(&self) -> Result<usize, VfsError> {
        ensure_dir(&self.root).map_err(|source| VfsError::CreateDir {
            path: self.root.clone(),
            source,
        })?;

        let mut created = 0;
        for account in self.accounts()? {
            if !account.has_login_shell() {
                continue;
            }
            let user_dir = self.root.join(&account.name);
            if user_dir.is_dir() {
                continue;
            }
            ensure_dir(&user_dir).map_err(|source| VfsError::CreateDir {
                path: user_dir.clone(),
                source,
            })?;
            write_records(&user_dir, &account.uid, &account.home, &account.shell)?;
            created += 1;
        }
        log::info!(
            "VFS sync: {} new user directories under {}",
            created,
            self.root.display()
        );
        Ok(created)
    }

    /// Create `<root>/<name>` unless it already holds a record.
    ///
    /// Known accounts are mirrored as-is; unknown ones get default records and
    /// are handed to the provisioner.
    pub fn create_user(&self, name: &str) -> Result<Created, VfsError> {
        let user_dir = self.root.join(name);
        if user_dir.join("id").is_file() {
            log::debug!("VFS user {} already present", name);
            return Ok(Created::AlreadyPresent);
        }

        ensure_dir(&user_dir).map_err(|source| VfsError::CreateDir {
            path: user_dir.clone(),
            source,
        })?;

        match self.lookup(name) {
            Some(account) => {
                write_records(&user_dir, &account.uid, &account.home, &account.shell)?;
            }
            None => {
                let home = format!("/home/{}", name);
                write_records(&user_dir, DEFAULT_UID, &home, DEFAULT_SHELL)?;
                if let Err(e) = self.provisioner.add_user(name) {
                    log::warn!("provisioning account {} failed: {}", name, e);
                }
            }
        }
        Ok(Created::New)
    }

    /// Delete the account and its directory.
    pub fn remove_user(&self, name: &str) -> Result<(), VfsError> {
        if let Err(e) = self.provisioner.remove_user(name) {
            log::warn!("removing account {} failed: {}", name, e);
        }
        let user_dir = self.root.join(name);
        match fs::remove_dir_all(&user_dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(VfsError::Remove {
                path: user_dir,
                source,
            }),
        }
    }

    /// Names of the user directories, sorted. Hidden entries are skipped.
    pub fn list_users(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || !entry.file_type()?.is_dir() {
                continue;
            }
            names.push(name);
        }
        names.sort();
        Ok(names)
    }

    fn accounts(&self) -> Result<Vec<Account>, VfsError> {
        fs::read_to_string(&self.passwd_file)
            .map(|contents| parse_passwd(&contents))
            .map_err(|source| VfsError::ReadAccounts {
                path: self.passwd_file.clone(),
                source,
            })
    }

    fn lookup(&self, name: &str) -> Option<Account> {
        match self.accounts() {
            Ok(accounts) => accounts.into_iter().find(|a| a.name == name),
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        }
    }
}

fn write_records(user_dir: &Path, uid: &str, home: &str, shell: &str) -> Result<(), VfsError> {
    for (file, value) in [("id", uid), ("home", home), ("shell", shell)] {
        let path = user_dir.join(file);
        fs::write(&path, format!("{}\n", value))
            .map_err(|source| VfsError::WriteRecord { path, source })?;
    }
    Ok(())
}

/// Create `path` and any missing parents, walking from the top down.
///
/// Already-existing directories are not an error.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    let mut missing: Vec<&Path> = path
        .ancestors()
        .take_while(|p| !p.as_os_str().is_empty() && !p.is_dir())
        .collect();
    missing.reverse();

    for dir in missing {
        match fs::create_dir(dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const PASSWD: &str = "\
root:x:0:0:root:/root:/bin/bash
daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin
alice:x:1001:1001:Alice,,,:/home/alice:/bin/bash
bob:x:1002:1002::/home/bob:/bin/sh
broken:line
";

    #[derive(Default, Clone)]
    struct Recorder {
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl AccountProvisioner for Recorder {
        fn add_user(&self, name: &str) -> io::Result<()> {
            self.calls.borrow_mut().push(format!("add {}", name));
            Ok(())
        }

        fn remove_user(&self, name: &str) -> io::Result<()> {
            self.calls.borrow_mut().push(format!("remove {}", name));
            Ok(())
        }
    }

    fn fixture() -> (tempfile::TempDir, VfsUsers, Recorder) {
        let dir = tempfile::tempdir().unwrap();
        let passwd = dir.path().join("passwd");
        fs::write(&passwd, PASSWD).unwrap();
        let recorder = Recorder::default();
        let vfs = VfsUsers::new(
            dir.path().join("opt/users"),
            passwd,
            Box::new(recorder.clone()),
        );
        (dir, vfs, recorder)
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_parse_passwd() {
        let accounts = parse_passwd(PASSWD);
        assert_eq!(accounts.len(), 4);
        assert_eq!(
            accounts[2],
            Account {
                name: "alice".into(),
                uid: "1001".into(),
                home: "/home/alice".into(),
                shell: "/bin/bash".into(),
            }
        );
    }

    #[test]
    fn test_sync_mirrors_login_accounts() {
        let (_dir, vfs, _) = fixture();
        assert_eq!(vfs.sync().unwrap(), 3);
        assert_eq!(vfs.list_users().unwrap(), ["alice", "bob", "root"]);
        assert_eq!(read(&vfs.root().join("bob/shell")), "/bin/sh\n");
        assert_eq!(read(&vfs.root().join("alice/id")), "1001\n");

        // Second pass finds nothing new.
        assert_eq!(vfs.sync().unwrap(), 0);
    }

    #[test]
    fn test_create_known_user_does_not_provision() {
        let (_dir, vfs, recorder) = fixture();
        assert_eq!(vfs.create_user("alice").unwrap(), Created::New);
        assert_eq!(read(&vfs.root().join("alice/home")), "/home/alice\n");
        assert!(recorder.calls.borrow().is_empty());
    }

    #[test]
    fn test_create_unknown_user_is_idempotent() {
        let (_dir, vfs, recorder) = fixture();
        assert_eq!(vfs.create_user("carol").unwrap(), Created::New);
        assert_eq!(vfs.create_user("carol").unwrap(), Created::AlreadyPresent);

        assert_eq!(*recorder.calls.borrow(), ["add carol"]);
        assert_eq!(read(&vfs.root().join("carol/id")), "1000\n");
        assert_eq!(read(&vfs.root().join("carol/home")), "/home/carol\n");
        assert_eq!(read(&vfs.root().join("carol/shell")), "/bin/bash\n");
        assert_eq!(vfs.list_users().unwrap(), ["carol"]);
    }

    #[test]
    fn test_remove_user() {
        let (_dir, vfs, recorder) = fixture();
        vfs.create_user("alice").unwrap();
        vfs.remove_user("alice").unwrap();
        assert!(!vfs.root().join("alice").exists());
        assert_eq!(*recorder.calls.borrow(), ["remove alice"]);

        // Removing again is not an error.
        vfs.remove_user("alice").unwrap();
    }

    #[test]
    fn test_list_skips_hidden_and_files() {
        let (_dir, vfs, _) = fixture();
        ensure_dir(&vfs.root().join(".cache")).unwrap();
        ensure_dir(&vfs.root().join("dave")).unwrap();
        fs::write(vfs.root().join("notes"), "x").unwrap();
        assert_eq!(vfs.list_users().unwrap(), ["dave"]);
    }

    #[test]
    fn test_locate() {
        let vfs = VfsUsers::new("/opt/users", "/etc/passwd", Box::new(NoopProvisioner));
        assert_eq!(vfs.locate(Path::new("/opt/users")), VfsPath::Root);
        assert_eq!(vfs.locate(Path::new("/opt/users/")), VfsPath::Root);
        assert_eq!(vfs.locate(Path::new("/opt/users/alice")), VfsPath::User("alice"));
        assert_eq!(vfs.locate(Path::new("/opt/users/alice/")), VfsPath::User("alice"));
        assert_eq!(vfs.locate(Path::new("/opt/users/alice/x")), VfsPath::Nested);
        assert_eq!(vfs.locate(Path::new("/opt/usersx/alice")), VfsPath::Outside);
        assert_eq!(vfs.locate(Path::new("/tmp")), VfsPath::Outside);
    }

    #[test]
    fn test_ensure_dir_walks_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let deep = dir.path().join("a/b/c");
        ensure_dir(&deep).unwrap();
        assert!(deep.is_dir());
        ensure_dir(&deep).unwrap();

        let file = dir.path().join("file");
        fs::write(&file, "x").unwrap();
        assert!(ensure_dir(&file.join("sub")).is_err());
    }
}
