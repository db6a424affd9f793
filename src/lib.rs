#![doc = include_str!("../README.md")]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

#[macro_use]
extern crate hex_literal;
#[macro_use]
extern crate log;

pub mod backend;
pub mod diskio;
pub mod error;
pub mod fattime;
pub mod io;
pub mod mbr;
pub mod sync;
pub mod types;

pub use backend::{Backend, Control, Device, Kind};
pub use diskio::{DiskIO, DiskResult, DiskStatus};
pub use mbr::{BootSector, PartitionTableEntry, PartitionType};
pub use types::{DriveID, SectorID};
