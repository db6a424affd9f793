use displaydoc::Display;
use thiserror::Error;

use crate::types::{DriveID, SectorID};

#[derive(Copy, Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum DataError {
    /// Boot sector too short, got {0} bytes
    SectorTooShort(usize),
    /// Boot signature mismatch, got {0:?}
    BootSignature([u8; 2]),
}

#[derive(Copy, Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Drive {0} is not a known drive slot
    UnknownDrive(DriveID),
    /// Drive {0} already bound
    AlreadyBound(DriveID),
}

#[derive(Copy, Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum RangeError {
    /// Sector {0} out of medium range
    OutOfRange(SectorID),
    /// Buffer length {0} is not a whole number of sectors
    Unaligned(usize),
}
