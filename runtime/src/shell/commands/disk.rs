//! Boot sector inspection: `\l <device>`

use std::io::{self, Write};
use std::path::Path;

const USAGE: &str = "Usage: \\l /dev/device_name (e.g., \\l /dev/sda)";

/// Decode and print the partition table of `device`.
///
/// `device` is the raw text after `\l `; surrounding whitespace is ignored.
/// Decode failures are reported as a single `Error: ...` line.
pub fn inspect(out: &mut dyn Write, device: &str) -> io::Result<()> {
    let device = device.trim();
    if device.is_empty() {
        return writeln!(out, "{}", USAGE);
    }

    match partition_table::read_device(Path::new(device)) {
        Ok(report) => write!(out, "{}", report),
        Err(e) => writeln!(out, "Error: {}", e),
    }
}
