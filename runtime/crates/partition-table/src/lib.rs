//! Boot sector decoding.
//!
//! Turns the first sector of a block device into a [`PartitionReport`]:
//! either the four legacy MBR entries, or, when a protective MBR entry is
//! present, the partition count from the GPT header in the following sector.
//!
//! Device I/O stays outside [`decode`]; the caller hands in the first sector
//! and a closure that fetches the second one on demand. [`read_device`] wires
//! the two together for a real device path.

mod device;

pub use device::read_device;

use std::fmt;
use std::path::PathBuf;

/// Size of a boot sector in bytes.
pub const SECTOR_SIZE: usize = 512;

/// Offset of the first legacy partition entry.
const ENTRY_TABLE_OFFSET: usize = 446;
/// Size of one legacy partition entry.
const ENTRY_SIZE: usize = 16;
/// Number of legacy partition entries.
const ENTRY_COUNT: usize = 4;

const BOOT_SIGNATURE: [u8; 2] = [0x55, 0xAA];
const BOOTABLE_FLAG: u8 = 0x80;
const PARTITION_TYPE_EMPTY: u8 = 0x00;
const PARTITION_TYPE_GPT_PROTECTIVE: u8 = 0xEE;

const GPT_SIGNATURE: &[u8; 8] = b"EFI PART";
/// Offset of the "number of partition entries" field in the GPT header.
const GPT_PARTITION_COUNT_OFFSET: usize = 80;

/// Sectors per binary megabyte, assuming 512-byte sectors.
const SECTORS_PER_MB: u32 = 2048;

/// One raw 512-byte sector.
pub type Sector = [u8; SECTOR_SIZE];

/// Errors produced while reading or decoding a boot sector.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The device could not be opened or read at all.
    #[error("Cannot open device {}", path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Fewer (or more) than 512 bytes were available for the boot sector.
    #[error("Cannot read disk")]
    ShortRead,
    /// Bytes 510..512 are not 0x55 0xAA.
    #[error("Invalid disk signature")]
    BadSignature,
}

/// A populated legacy (MBR) partition entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyPartition {
    /// 1-based slot in the partition table.
    pub index: usize,
    pub partition_type: u8,
    pub start_lba: u32,
    pub size_mb: u32,
    pub bootable: bool,
}

/// Result of decoding a boot sector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionReport {
    /// Classic MBR; only entries with a nonzero type are listed.
    Legacy(Vec<LegacyPartition>),
    /// Protective MBR. `None` when the GPT header was missing or unreadable.
    Gpt { partition_count: Option<u32> },
}

/// Decode a boot sector.
///
/// `raw_sector` must be exactly [`SECTOR_SIZE`] bytes. `second_sector` is only
/// invoked when the table turns out to be a protective MBR.
pub fn decode<F>(raw_sector: &[u8], second_sector: F) -> Result<PartitionReport, DecodeError>
where
    F: FnOnce() -> Option<Sector>,
{
    let sector: &Sector = raw_sector
        .try_into()
        .map_err(|_| DecodeError::ShortRead)?;

    if sector[SECTOR_SIZE - 2..] != BOOT_SIGNATURE {
        return Err(DecodeError::BadSignature);
    }

    let entries = (0..ENTRY_COUNT).map(|i| entry(sector, i));

    if entries
        .clone()
        .any(|e| e[4] == PARTITION_TYPE_GPT_PROTECTIVE)
    {
        let partition_count = second_sector().and_then(|header| gpt_partition_count(&header));
        log::debug!("protective MBR, GPT partition count {:?}", partition_count);
        return Ok(PartitionReport::Gpt { partition_count });
    }

    let partitions = entries
        .enumerate()
        .filter(|(_, e)| e[4] != PARTITION_TYPE_EMPTY)
        .map(|(i, e)| LegacyPartition {
            index: i + 1,
            partition_type: e[4],
            start_lba: le_u32(&e[8..12]),
            size_mb: le_u32(&e[12..16]) / SECTORS_PER_MB,
            bootable: e[0] == BOOTABLE_FLAG,
        })
        .collect();

    Ok(PartitionReport::Legacy(partitions))
}

fn entry(sector: &Sector, index: usize) -> &[u8] {
    let start = ENTRY_TABLE_OFFSET + index * ENTRY_SIZE;
    &sector[start..start + ENTRY_SIZE]
}

fn gpt_partition_count(header: &Sector) -> Option<u32> {
    if &header[..GPT_SIGNATURE.len()] != GPT_SIGNATURE {
        return None;
    }
    Some(le_u32(
        &header[GPT_PARTITION_COUNT_OFFSET..GPT_PARTITION_COUNT_OFFSET + 4],
    ))
}

fn le_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

impl fmt::Display for LegacyPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Partition {}: Size={}MB, Bootable: {}",
            self.index,
            self.size_mb,
            if self.bootable { "Yes" } else { "No" }
        )
    }
}

impl fmt::Display for PartitionReport {
    /// One line per partition (legacy) or a single summary line (GPT).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionReport::Legacy(partitions) => {
                for p in partitions {
                    writeln!(f, "{}", p)?;
                }
                Ok(())
            }
            PartitionReport::Gpt {
                partition_count: Some(n),
            } => writeln!(f, "GPT partitions: {}", n),
            PartitionReport::Gpt {
                partition_count: None,
            } => writeln!(f, "GPT partitions: unknown"),
        }
    }
}
