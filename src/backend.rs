use derive_more::Display;

use crate::io::{Medium, BLOCK_SIZE};
use crate::types::SectorID;

/// Backend-local result of a single call, translated by [`DiskIO`](crate::diskio::DiskIO)
pub type RawCode = i32;

/// Raw result codes returned by read, write and ioctl
pub mod code {
    use super::RawCode;

    pub const OK: RawCode = 0;
    pub const ERROR: RawCode = 1;
    pub const WRITE_PROTECTED: RawCode = 2;
    pub const NOT_READY: RawCode = 3;
    pub const PARAMETER: RawCode = 4;
    pub const NOT_SUPPORTED: RawCode = 5;
}

/// Raw status bits returned by status and initialize
pub mod status {
    use super::RawCode;

    pub const NOINIT: RawCode = 0x01;
    pub const NODISK: RawCode = 0x02;
    pub const PROTECT: RawCode = 0x04;
}

/// Miscellaneous control commands
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Control {
    /// Complete pending writes
    Sync,
    GetSectorCount,
    GetSectorSize,
    /// Erase block size in unit of sector
    GetBlockSize,
    /// Sectors no longer in use, may be erased
    Trim,
    Other(u8),
}

impl From<u8> for Control {
    fn from(byte: u8) -> Self {
        match byte {
            0 => Self::Sync,
            1 => Self::GetSectorCount,
            2 => Self::GetSectorSize,
            3 => Self::GetBlockSize,
            4 => Self::Trim,
            _ => Self::Other(byte),
        }
    }
}

impl From<Control> for u8 {
    fn from(control: Control) -> u8 {
        match control {
            Control::Sync => 0,
            Control::GetSectorCount => 1,
            Control::GetSectorSize => 2,
            Control::GetBlockSize => 3,
            Control::Trim => 4,
            Control::Other(byte) => byte,
        }
    }
}

/// Capability set every drive backend provides.
///
/// Backends only speak raw codes; the drive multiplexer is the single place
/// translating them into [`DiskResult`](crate::diskio::DiskResult) and
/// [`DiskStatus`](crate::diskio::DiskStatus).
pub trait Backend {
    /// Bit set of [`status`] flags, safe to call before initialize
    fn status(&self) -> RawCode;
    /// Idempotent, returns the status after initialization
    fn initialize(&mut self) -> RawCode;
    /// Buffer holds at least `count` sectors
    fn read(&mut self, buf: &mut [u8], sector: SectorID, count: usize) -> RawCode;
    /// Buffer holds at least `count` sectors
    fn write(&mut self, buf: &[u8], sector: SectorID, count: usize) -> RawCode;

    fn ioctl(&mut self, _control: Control, _buf: &mut [u8]) -> RawCode {
        code::NOT_SUPPORTED
    }
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum Kind {
    RAM,
    MMC,
    USB,
}

/// Backend over any [`Medium`], one implementation shared by every drive kind
#[derive(Debug)]
pub struct Device<M> {
    kind: Kind,
    medium: M,
    initialized: bool,
}

impl<M: Medium> Device<M> {
    pub fn new(kind: Kind, medium: M) -> Self {
        Self { kind, medium, initialized: false }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    pub fn medium_mut(&mut self) -> &mut M {
        &mut self.medium
    }

    pub fn into_inner(self) -> M {
        self.medium
    }

    /// Length in bytes of a transfer after validating it against the medium
    fn transfer_len(&self, buf_len: usize, sector: SectorID, count: usize) -> Result<usize, RawCode> {
        if !self.initialized {
            return Err(code::NOT_READY);
        }
        let len = count.checked_mul(BLOCK_SIZE).ok_or(code::PARAMETER)?;
        if count == 0 || buf_len < len {
            return Err(code::PARAMETER);
        }
        match sector.checked_add(count as u64) {
            Some(end) if u64::from(end) <= self.medium.num_blocks() => Ok(len),
            _ => Err(code::PARAMETER),
        }
    }

    fn put(buf: &mut [u8], bytes: &[u8]) -> RawCode {
        match buf.get_mut(..bytes.len()) {
            Some(dest) => {
                dest.copy_from_slice(bytes);
                code::OK
            }
            None => code::PARAMETER,
        }
    }

    fn sector_count(&self, buf: &mut [u8]) -> RawCode {
        let num_blocks = self.medium.num_blocks();
        if buf.len() >= 8 {
            return Self::put(buf, &num_blocks.to_le_bytes());
        }
        match u32::try_from(num_blocks) {
            Ok(num_blocks) => Self::put(buf, &num_blocks.to_le_bytes()),
            Err(_) => code::PARAMETER,
        }
    }
}

impl<M: Medium> Backend for Device<M> {
    fn status(&self) -> RawCode {
        let mut raw = 0;
        if !self.initialized {
            raw |= status::NOINIT;
        }
        if self.medium.write_protected() {
            raw |= status::PROTECT;
        }
        raw
    }

    fn initialize(&mut self) -> RawCode {
        if !self.initialized {
            match self.medium.init() {
                Ok(()) => {
                    debug!("{} medium ready, {} blocks", self.kind, self.medium.num_blocks());
                    self.initialized = true;
                }
                Err(e) => warn!("{} medium init failed: {:?}", self.kind, e),
            }
        }
        self.status()
    }

    fn read(&mut self, buf: &mut [u8], sector: SectorID, count: usize) -> RawCode {
        let len = match self.transfer_len(buf.len(), sector, count) {
            Ok(len) => len,
            Err(code) => return code,
        };
        match self.medium.read(sector, &mut buf[..len]) {
            Ok(()) => code::OK,
            Err(e) => {
                warn!("{} read {}+{} failed: {:?}", self.kind, sector, count, e);
                code::ERROR
            }
        }
    }

    fn write(&mut self, buf: &[u8], sector: SectorID, count: usize) -> RawCode {
        if self.initialized && self.medium.write_protected() {
            return code::WRITE_PROTECTED;
        }
        let len = match self.transfer_len(buf.len(), sector, count) {
            Ok(len) => len,
            Err(code) => return code,
        };
        match self.medium.write(sector, &buf[..len]) {
            Ok(()) => code::OK,
            Err(e) => {
                warn!("{} write {}+{} failed: {:?}", self.kind, sector, count, e);
                code::ERROR
            }
        }
    }

    fn ioctl(&mut self, control: Control, buf: &mut [u8]) -> RawCode {
        if !self.initialized {
            return code::NOT_READY;
        }
        match control {
            Control::Sync => match self.medium.flush() {
                Ok(()) => code::OK,
                Err(e) => {
                    warn!("{} sync failed: {:?}", self.kind, e);
                    code::ERROR
                }
            },
            Control::GetSectorCount => self.sector_count(buf),
            Control::GetSectorSize => Self::put(buf, &(BLOCK_SIZE as u16).to_le_bytes()),
            Control::GetBlockSize => Self::put(buf, &self.medium.erase_block_size().to_le_bytes()),
            Control::Trim | Control::Other(_) => code::NOT_SUPPORTED,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{code, status, Backend, Control, Device, Kind};
    use crate::io::{RamMedium, BLOCK_SIZE};
    use crate::types::SectorID;

    fn ram(num_blocks: usize) -> Device<RamMedium> {
        Device::new(Kind::RAM, RamMedium::new(num_blocks))
    }

    #[test]
    fn test_status_before_initialize() {
        let mut device = ram(4);
        assert_eq!(device.status(), status::NOINIT);
        let mut buf = [0u8; BLOCK_SIZE];
        assert_eq!(device.read(&mut buf, SectorID::MBR, 1), code::NOT_READY);
        assert_eq!(device.write(&buf, SectorID::MBR, 1), code::NOT_READY);
        assert_eq!(device.ioctl(Control::Sync, &mut buf), code::NOT_READY);
    }

    #[test]
    fn test_initialize_idempotent() {
        let mut device = ram(4);
        let once = device.initialize();
        assert_eq!(once, 0);
        assert_eq!(device.initialize(), once);
        assert_eq!(device.status(), once);
    }

    #[test]
    fn test_status_bits_compose() {
        let mut medium = RamMedium::new(4);
        medium.set_write_protected(true);
        let mut device = Device::new(Kind::MMC, medium);
        assert_eq!(device.status(), status::NOINIT | status::PROTECT);
        assert_eq!(device.initialize(), status::PROTECT);
        let buf = [0u8; BLOCK_SIZE];
        assert_eq!(device.write(&buf, SectorID::MBR, 1), code::WRITE_PROTECTED);
    }

    #[test]
    fn test_write_past_end() {
        let mut device = ram(8);
        device.initialize();
        let buf = [0xFFu8; BLOCK_SIZE];
        assert_eq!(device.write(&buf, SectorID::from(8u64), 1), code::PARAMETER);
        assert_eq!(device.write(&buf, SectorID::from(u64::MAX), 1), code::PARAMETER);
        assert!(device.medium().blocks()[0].iter().all(|&b| b == 0));
        assert_eq!(device.write(&buf, SectorID::from(7u64), 1), code::OK);
    }

    #[test]
    fn test_bad_parameters() {
        let mut device = ram(8);
        device.initialize();
        let mut buf = [0u8; BLOCK_SIZE];
        assert_eq!(device.read(&mut buf, SectorID::MBR, 0), code::PARAMETER);
        assert_eq!(device.read(&mut buf, SectorID::MBR, 2), code::PARAMETER);
        assert_eq!(device.read(&mut buf[..511], SectorID::MBR, 1), code::PARAMETER);
        assert_eq!(device.read(&mut buf, SectorID::MBR, usize::MAX), code::PARAMETER);
    }

    #[test]
    fn test_ioctl() {
        let mut device = ram(8);
        device.initialize();
        let mut buf = [0u8; 8];
        assert_eq!(device.ioctl(Control::GetSectorCount, &mut buf), code::OK);
        assert_eq!(u64::from_le_bytes(buf), 8);
        let mut buf = [0u8; 4];
        assert_eq!(device.ioctl(Control::GetSectorCount, &mut buf), code::OK);
        assert_eq!(u32::from_le_bytes(buf), 8);
        assert_eq!(device.ioctl(Control::GetSectorSize, &mut buf), code::OK);
        assert_eq!(u16::from_le_bytes([buf[0], buf[1]]), 512);
        assert_eq!(device.ioctl(Control::GetBlockSize, &mut buf), code::OK);
        assert_eq!(u32::from_le_bytes(buf), 1);
        assert_eq!(device.ioctl(Control::Sync, &mut []), code::OK);
        assert_eq!(device.ioctl(Control::Trim, &mut buf), code::NOT_SUPPORTED);
        assert_eq!(device.ioctl(Control::from(0x30), &mut buf), code::NOT_SUPPORTED);
        assert_eq!(device.ioctl(Control::GetSectorSize, &mut [0u8; 1]), code::PARAMETER);
    }

    #[test]
    fn test_control_codes() {
        for byte in 0..=u8::MAX {
            assert_eq!(u8::from(Control::from(byte)), byte);
        }
        assert_eq!(Control::from(1), Control::GetSectorCount);
        assert_eq!(Control::from(9), Control::Other(9));
    }
}
