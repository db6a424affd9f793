pub mod partition;
pub mod ram;
#[cfg(feature = "std")]
pub mod std;

use core::fmt::Debug;

use crate::types::SectorID;

pub use partition::Partition;
pub use ram::RamMedium;

pub const BLOCK_SIZE: usize = 512;
pub type Block = [u8; BLOCK_SIZE];

/// Physical storage behind a drive, e.g. an SD card, a USB mass storage LUN or plain memory.
///
/// Implementations only move whole 512-byte blocks; range, protection and
/// initialization checks are done by [`Device`](crate::backend::Device).
pub trait Medium {
    type Error: Debug;

    /// Number of addressable 512-byte blocks
    fn num_blocks(&self) -> u64;

    fn write_protected(&self) -> bool {
        false
    }

    /// Bring the medium up, called once per successful disk initialize
    fn init(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Caller guarantees buf.len() is a multiple of BLOCK_SIZE and the range fits in num_blocks
    fn read(&mut self, id: SectorID, buf: &mut [u8]) -> Result<(), Self::Error>;
    /// Caller guarantees buf.len() is a multiple of BLOCK_SIZE and the range fits in num_blocks
    fn write(&mut self, id: SectorID, buf: &[u8]) -> Result<(), Self::Error>;

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Erase block size in unit of sector, 1 if unknown
    fn erase_block_size(&self) -> u32 {
        1
    }
}
