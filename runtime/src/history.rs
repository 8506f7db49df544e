//! Command history: in-memory list mirrored to an append-only file.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Session history. Earlier sessions are loaded from the file on open.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<String>,
    file: Option<File>,
    path: Option<PathBuf>,
}

impl History {
    /// History that is never persisted.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load existing records from `path` and open it for appending.
    pub fn open(path: &Path) -> io::Result<Self> {
        let entries = match File::open(path) {
            Ok(file) => BufReader::new(file).lines().collect::<io::Result<Vec<_>>>()?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e),
        };
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        log::debug!(
            "loaded {} history entries from {}",
            entries.len(),
            path.display()
        );
        Ok(Self {
            entries,
            file: Some(file),
            path: Some(path.to_path_buf()),
        })
    }

    /// Append a line to memory and, if persisted, to the file.
    ///
    /// A failed file write is logged and otherwise ignored.
    pub fn record(&mut self, line: &str) {
        self.entries.push(line.to_string());
        let Some(file) = self.file.as_mut() else {
            return;
        };
        if let Err(e) = writeln!(file, "{}", line).and_then(|_| file.flush()) {
            let path = self.path.as_deref().unwrap_or(Path::new("?"));
            log::warn!("cannot append to history file {}: {}", path.display(), e);
        }
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory() {
        let mut history = History::in_memory();
        history.record("ls");
        history.record("history");
        assert_eq!(history.entries(), ["ls", "history"]);
    }

    #[test]
    fn test_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".kubsh_history");

        let mut first = History::open(&path).unwrap();
        assert!(first.entries().is_empty());
        first.record("echo one");
        first.record("\\q");
        drop(first);

        let mut second = History::open(&path).unwrap();
        assert_eq!(second.entries(), ["echo one", "\\q"]);
        second.record("history");

        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk, "echo one\n\\q\nhistory\n");
    }
}
