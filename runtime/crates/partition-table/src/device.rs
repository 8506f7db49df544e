//! Reading boot sectors from a device or image file.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::{decode, DecodeError, PartitionReport, Sector, SECTOR_SIZE};

/// Open `path` read-only and decode its boot sector.
///
/// The second sector is read only when the first one holds a protective MBR.
/// A missing or short second sector yields an unknown GPT partition count.
pub fn read_device(path: &Path) -> Result<PartitionReport, DecodeError> {
    let mut device = File::open(path).map_err(|source| {
        log::warn!("open {}: {}", path.display(), source);
        DecodeError::IoFailure {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let first = read_sector(&mut device).map_err(|e| {
        log::warn!("read {}: {}", path.display(), e);
        DecodeError::ShortRead
    })?;

    decode(&first, || match read_sector(&mut device) {
        Ok(sector) => Some(sector),
        Err(e) => {
            log::debug!("second sector of {}: {}", path.display(), e);
            None
        }
    })
}

/// Read exactly one sector, retrying on short reads until EOF.
fn read_sector<R: Read>(reader: &mut R) -> io::Result<Sector> {
    let mut sector = [0u8; SECTOR_SIZE];
    let mut filled = 0;
    while filled < SECTOR_SIZE {
        match reader.read(&mut sector[filled..]) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("short read: {} of {} bytes", filled, SECTOR_SIZE),
                ))
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(sector)
}
