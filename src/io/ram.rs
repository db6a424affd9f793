use alloc::vec;
use alloc::vec::Vec;

use super::{Block, Medium, BLOCK_SIZE};
use crate::error::RangeError;
use crate::types::SectorID;

/// Heap backed medium, mostly used as drive 0 and for disk images under test
#[derive(Clone, Debug)]
pub struct RamMedium {
    blocks: Vec<Block>,
    write_protected: bool,
}

impl RamMedium {
    pub fn new(num_blocks: usize) -> Self {
        Self { blocks: vec![[0u8; BLOCK_SIZE]; num_blocks], write_protected: false }
    }

    /// Load a disk image, last partial block is zero padded
    pub fn from_image(image: &[u8]) -> Self {
        let blocks = image
            .chunks(BLOCK_SIZE)
            .map(|chunk| {
                let mut block = [0u8; BLOCK_SIZE];
                block[..chunk.len()].copy_from_slice(chunk);
                block
            })
            .collect();
        Self { blocks, write_protected: false }
    }

    pub fn set_write_protected(&mut self, protected: bool) {
        self.write_protected = protected;
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    fn range(&self, id: SectorID, len: usize) -> Result<core::ops::Range<usize>, RangeError> {
        if len % BLOCK_SIZE != 0 {
            return Err(RangeError::Unaligned(len));
        }
        let start = u64::from(id);
        let end = start.checked_add((len / BLOCK_SIZE) as u64);
        match end {
            Some(end) if end <= self.blocks.len() as u64 => Ok(start as usize..end as usize),
            _ => Err(RangeError::OutOfRange(id)),
        }
    }
}

impl Medium for RamMedium {
    type Error = RangeError;

    fn num_blocks(&self) -> u64 {
        self.blocks.len() as u64
    }

    fn write_protected(&self) -> bool {
        self.write_protected
    }

    fn read(&mut self, id: SectorID, buf: &mut [u8]) -> Result<(), Self::Error> {
        let range = self.range(id, buf.len())?;
        for (chunk, block) in buf.chunks_exact_mut(BLOCK_SIZE).zip(&self.blocks[range]) {
            chunk.copy_from_slice(block);
        }
        Ok(())
    }

    fn write(&mut self, id: SectorID, buf: &[u8]) -> Result<(), Self::Error> {
        let range = self.range(id, buf.len())?;
        for (block, chunk) in self.blocks[range].iter_mut().zip(buf.chunks_exact(BLOCK_SIZE)) {
            block.copy_from_slice(chunk);
        }
        Ok(())
    }
}
