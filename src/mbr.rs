//! Master boot record, the classic partitioning scheme found in sector 0
//!
//! Decoding borrows the sector buffer and copies nothing; validation of the
//! trailing signature is a separate step so that half written images can still
//! be inspected.

use core::mem::{align_of, size_of};

use bitfield::bitfield;
use derive_more::Into;
use memoffset::offset_of;

use crate::error::DataError;
use crate::io::BLOCK_SIZE;

pub const BOOT_SIGNATURE: [u8; 2] = hex!("55 AA");
pub const NUM_PARTITIONS: usize = 4;

const ENTRY_SIZE: usize = 16;

#[repr(C)]
struct Layout {
    bootstrap: [u8; 440],
    unique_disk_id: [u8; 4],
    reserved: [u8; 2],
    partition_table: [[u8; ENTRY_SIZE]; NUM_PARTITIONS],
    signature: [u8; 2],
}

#[allow(dead_code)]
#[repr(C)]
struct EntryLayout {
    attributes: u8,
    chs_start: [u8; 3],
    partition_type: u8,
    chs_last: [u8; 3],
    start_sector: [u8; 4],
    number_of_sectors: [u8; 4],
}

const _: () = assert!(size_of::<Layout>() == BLOCK_SIZE);
const _: () = assert!(align_of::<Layout>() == 1);
const _: () = assert!(size_of::<EntryLayout>() == ENTRY_SIZE);

fn le_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}

// Bit 7 marks the bootable partition
bitfield! {
    #[derive(Copy, Clone, Debug, Default, Into, PartialEq, Eq)]
    pub struct DriveAttributes(u8);
    pub active, _: 7;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PartitionType {
    Unused,
    FAT12,
    /// FAT16 smaller than 32MiB
    FAT16,
    Extended,
    /// FAT16 of 32MiB or more
    FAT16B,
    /// NTFS or exFAT
    NTFS,
    FAT32,
    FAT32LBA,
    FAT16LBA,
    ExtendedLBA,
    Linux,
    FreeBSD,
    AppleHFS,
    Other(u8),
}

impl From<u8> for PartitionType {
    fn from(byte: u8) -> Self {
        match byte {
            0x00 => Self::Unused,
            0x01 => Self::FAT12,
            0x04 => Self::FAT16,
            0x05 => Self::Extended,
            0x06 => Self::FAT16B,
            0x07 => Self::NTFS,
            0x0B => Self::FAT32,
            0x0C => Self::FAT32LBA,
            0x0E => Self::FAT16LBA,
            0x0F => Self::ExtendedLBA,
            0x83 => Self::Linux,
            0xA5 => Self::FreeBSD,
            0xAF => Self::AppleHFS,
            _ => Self::Other(byte),
        }
    }
}

impl From<PartitionType> for u8 {
    fn from(partition_type: PartitionType) -> u8 {
        match partition_type {
            PartitionType::Unused => 0x00,
            PartitionType::FAT12 => 0x01,
            PartitionType::FAT16 => 0x04,
            PartitionType::Extended => 0x05,
            PartitionType::FAT16B => 0x06,
            PartitionType::NTFS => 0x07,
            PartitionType::FAT32 => 0x0B,
            PartitionType::FAT32LBA => 0x0C,
            PartitionType::FAT16LBA => 0x0E,
            PartitionType::ExtendedLBA => 0x0F,
            PartitionType::Linux => 0x83,
            PartitionType::FreeBSD => 0xA5,
            PartitionType::AppleHFS => 0xAF,
            PartitionType::Other(byte) => byte,
        }
    }
}

impl PartitionType {
    pub fn is_fat(&self) -> bool {
        matches!(
            self,
            Self::FAT12 | Self::FAT16 | Self::FAT16B | Self::FAT16LBA | Self::FAT32 | Self::FAT32LBA
        )
    }

    pub fn is_extended(&self) -> bool {
        matches!(self, Self::Extended | Self::ExtendedLBA)
    }
}

/// 16-byte window over one partition table slot
#[derive(Copy, Clone, Debug)]
pub struct PartitionTableEntry<'a> {
    data: &'a [u8; ENTRY_SIZE],
}

impl<'a> PartitionTableEntry<'a> {
    pub fn attributes(&self) -> DriveAttributes {
        DriveAttributes(self.data[offset_of!(EntryLayout, attributes)])
    }

    pub fn partition_type(&self) -> PartitionType {
        PartitionType::from(self.data[offset_of!(EntryLayout, partition_type)])
    }

    /// First sector of the partition in LBA
    pub fn start_sector(&self) -> u32 {
        le_u32(self.data, offset_of!(EntryLayout, start_sector))
    }

    pub fn number_of_sectors(&self) -> u32 {
        le_u32(self.data, offset_of!(EntryLayout, number_of_sectors))
    }

    /// First sector in CHS, the raw (cylinder, head, sector) bytes in on-disk order
    pub fn chs_start(&self) -> (u8, u8, u8) {
        let offset = offset_of!(EntryLayout, chs_start);
        (self.data[offset], self.data[offset + 1], self.data[offset + 2])
    }

    /// Last sector in CHS, the raw (cylinder, head, sector) bytes in on-disk order
    pub fn chs_last(&self) -> (u8, u8, u8) {
        let offset = offset_of!(EntryLayout, chs_last);
        (self.data[offset], self.data[offset + 1], self.data[offset + 2])
    }

    pub fn is_used(&self) -> bool {
        self.partition_type() != PartitionType::Unused && self.number_of_sectors() > 0
    }

    pub fn as_bytes(&self) -> &'a [u8; ENTRY_SIZE] {
        self.data
    }
}

#[derive(Copy, Clone, Debug)]
pub struct BootSector<'a> {
    data: &'a [u8; BLOCK_SIZE],
}

impl<'a> TryFrom<&'a [u8]> for BootSector<'a> {
    type Error = DataError;

    fn try_from(bytes: &'a [u8]) -> Result<Self, DataError> {
        Self::new(bytes)
    }
}

impl<'a> BootSector<'a> {
    /// Bytes past the first sector are ignored
    pub fn new(bytes: &'a [u8]) -> Result<Self, DataError> {
        match bytes.get(..BLOCK_SIZE).map(<&[u8; BLOCK_SIZE]>::try_from) {
            Some(Ok(data)) => Ok(Self { data }),
            _ => Err(DataError::SectorTooShort(bytes.len())),
        }
    }

    fn layout(&self) -> &'a Layout {
        unsafe { core::mem::transmute(self.data) }
    }

    /// Executable code area, bytes 0..440
    pub fn bootstrap(&self) -> &'a [u8] {
        &self.layout().bootstrap
    }

    pub fn unique_disk_id(&self) -> u32 {
        u32::from_le_bytes(self.layout().unique_disk_id)
    }

    pub fn reserved(&self) -> [u8; 2] {
        self.layout().reserved
    }

    pub fn signature(&self) -> [u8; 2] {
        self.layout().signature
    }

    pub fn has_signature(&self) -> bool {
        self.signature() == BOOT_SIGNATURE
    }

    pub fn validate(&self) -> Result<(), DataError> {
        match self.signature() {
            BOOT_SIGNATURE => Ok(()),
            signature => Err(DataError::BootSignature(signature)),
        }
    }

    /// Panics unless index < 4, asking for a fifth slot is a caller bug
    pub fn partition_table(&self, index: usize) -> PartitionTableEntry<'a> {
        assert!(index < NUM_PARTITIONS, "invalid partition table index {}", index);
        PartitionTableEntry { data: &self.layout().partition_table[index] }
    }

    pub fn partitions(&self) -> impl Iterator<Item = PartitionTableEntry<'a>> + 'a {
        let boot_sector = *self;
        (0..NUM_PARTITIONS).map(move |index| boot_sector.partition_table(index))
    }

    /// Slots in use together with their index
    pub fn used_partitions(&self) -> heapless::Vec<(usize, PartitionTableEntry<'a>), NUM_PARTITIONS> {
        self.partitions().enumerate().filter(|(_, entry)| entry.is_used()).collect()
    }

    pub fn as_bytes(&self) -> &'a [u8; BLOCK_SIZE] {
        self.data
    }
}
