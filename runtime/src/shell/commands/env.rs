//! Environment listing: `\e $NAME`

use std::ffi::OsStr;
use std::io::{self, Write};

use crate::shell::resolver::PATH_LIST_DELIMITER;

/// Print the value of `name`, one segment per line if it is a path list.
///
/// `value` is the variable's current value, `None` when unset.
pub fn list_var(out: &mut dyn Write, name: &str, value: Option<&OsStr>) -> io::Result<()> {
    let Some(value) = value else {
        return writeln!(out, "{}: not found", name);
    };
    for segment in value.to_string_lossy().split(PATH_LIST_DELIMITER) {
        writeln!(out, "{}", segment)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(name: &str, value: Option<&str>) -> String {
        let mut out = Vec::new();
        list_var(&mut out, name, value.map(OsStr::new)).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_path_list_split() {
        assert_eq!(list("FOO", Some("a:b:c")), "a\nb\nc\n");
        assert_eq!(list("P", Some("/usr/bin::/bin:")), "/usr/bin\n\n/bin\n\n");
    }

    #[test]
    fn test_plain_value() {
        assert_eq!(list("HOME", Some("/home/alice")), "/home/alice\n");
        assert_eq!(list("EMPTY", Some("")), "\n");
    }

    #[test]
    fn test_unset() {
        assert_eq!(list("NOPE", None), "NOPE: not found\n");
    }
}
