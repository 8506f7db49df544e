//! Core line builtins: history, echo, debug

use std::io::{self, Write};

/// Print history entries, oldest first.
pub fn history(out: &mut dyn Write, entries: &[String]) -> io::Result<()> {
    for entry in entries {
        writeln!(out, "{}", entry)?;
    }
    Ok(())
}

/// Print `text` followed by a newline. Backs both `echo` and `debug '...'`.
pub fn print(out: &mut dyn Write, text: &str) -> io::Result<()> {
    writeln!(out, "{}", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_in_order() {
        let mut out = Vec::new();
        let entries = vec!["ls".to_string(), "echo hi".to_string(), "history".to_string()];
        history(&mut out, &entries).unwrap();
        assert_eq!(out, b"ls\necho hi\nhistory\n");
    }

    #[test]
    fn test_print_verbatim() {
        let mut out = Vec::new();
        print(&mut out, "  spaced  'quotes'  ").unwrap();
        assert_eq!(out, b"  spaced  'quotes'  \n");
    }
}
