use super::Medium;
use crate::mbr::PartitionTableEntry;
use crate::types::SectorID;

/// Window over a medium, sector 0 of the window maps to `offset` of the medium.
///
/// Capacity never reaches past the end of the underlying medium, so a partition
/// entry claiming more sectors than the disk holds is simply cut short.
#[derive(Debug)]
pub struct Partition<M> {
    medium: M,
    offset: u64,
    num_blocks: u64,
}

impl<M: Medium> Partition<M> {
    pub fn new(medium: M, offset: SectorID, num_blocks: u64) -> Self {
        let offset = u64::from(offset);
        let available = medium.num_blocks().saturating_sub(offset);
        let num_blocks = num_blocks.min(available);
        trace!("Partition offset {} num-blocks {}", offset, num_blocks);
        Self { medium, offset, num_blocks }
    }

    /// Unused entries give an empty window
    pub fn from_entry(medium: M, entry: &PartitionTableEntry) -> Self {
        let num_blocks = if entry.is_used() { entry.number_of_sectors() as u64 } else { 0 };
        Self::new(medium, SectorID::from(entry.start_sector() as u64), num_blocks)
    }

    pub fn offset(&self) -> SectorID {
        SectorID::from(self.offset)
    }

    pub fn into_inner(self) -> M {
        self.medium
    }
}

impl<M: Medium> Medium for Partition<M> {
    type Error = M::Error;

    fn num_blocks(&self) -> u64 {
        self.num_blocks
    }

    fn write_protected(&self) -> bool {
        self.medium.write_protected()
    }

    fn init(&mut self) -> Result<(), Self::Error> {
        self.medium.init()
    }

    fn read(&mut self, id: SectorID, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.medium.read(id + self.offset, buf)
    }

    fn write(&mut self, id: SectorID, buf: &[u8]) -> Result<(), Self::Error> {
        self.medium.write(id + self.offset, buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.medium.flush()
    }

    fn erase_block_size(&self) -> u32 {
        self.medium.erase_block_size()
    }
}
