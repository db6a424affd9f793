use bitfield::bitfield;
use derive_more::Into;

use crate::backend::{code, status, Backend, Control, RawCode};
use crate::error::ConfigError;
use crate::sync::{acquire, Shared};
use crate::types::{DriveID, SectorID};

/// Number of drive slots, indexed by [`DriveID`]
pub const NUM_DRIVES: usize = 3;

bitfield! {
    #[derive(Copy, Clone, Debug, Default, Into, PartialEq, Eq)]
    pub struct DiskStatus(u8);
    pub not_initialized, set_not_initialized: 0;
    pub no_disk, set_no_disk: 1;
    pub write_protected, set_write_protected: 2;
}

impl DiskStatus {
    const MASK: u8 = (status::NOINIT | status::NODISK | status::PROTECT) as u8;

    pub fn not_ready() -> Self {
        let mut status = Self::default();
        status.set_not_initialized(true);
        status
    }

    /// Unknown bits are dropped, a negative code means the backend could not tell
    pub fn from_raw(raw: RawCode) -> Self {
        match u8::try_from(raw) {
            Ok(bits) => Self(bits & Self::MASK),
            Err(_) => Self::not_ready(),
        }
    }

    /// Initialized, medium present and writable
    pub fn is_ready(&self) -> bool {
        self.0 == 0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
#[must_use]
pub enum DiskResult {
    Ok = 0,
    Error = 1,
    WriteProtected = 2,
    ParameterError = 3,
}

impl DiskResult {
    pub fn from_raw(raw: RawCode) -> Self {
        match raw {
            code::OK => Self::Ok,
            code::WRITE_PROTECTED => Self::WriteProtected,
            code::PARAMETER | code::NOT_SUPPORTED => Self::ParameterError,
            _ => Self::Error,
        }
    }

    pub fn is_ok(&self) -> bool {
        *self == Self::Ok
    }

    pub fn into_result(self) -> Result<(), DiskResult> {
        match self {
            Self::Ok => Ok(()),
            failure => Err(failure),
        }
    }
}

impl From<DiskResult> for u8 {
    fn from(result: DiskResult) -> u8 {
        result as u8
    }
}

/// Backends a drive slot accepts, only `Send` ones when drives are shared across threads
#[cfg(feature = "sync")]
pub trait DriveBackend: Backend + Send {}
#[cfg(feature = "sync")]
impl<B: Backend + Send> DriveBackend for B {}

#[cfg(not(feature = "sync"))]
pub trait DriveBackend: Backend {}
#[cfg(not(feature = "sync"))]
impl<B: Backend> DriveBackend for B {}

type Slot = Option<Shared<dyn DriveBackend>>;

/// Drive table under construction, frozen into a [`DiskIO`] by [`Builder::build`]
#[derive(Default)]
pub struct Builder {
    drives: [Slot; NUM_DRIVES],
}

impl Builder {
    pub fn bind<B: DriveBackend + 'static>(
        mut self,
        drive: DriveID,
        backend: Shared<B>,
    ) -> Result<Self, ConfigError> {
        let slot = self.drives.get_mut(drive.index()).ok_or(ConfigError::UnknownDrive(drive))?;
        if slot.is_some() {
            return Err(ConfigError::AlreadyBound(drive));
        }
        let backend: Shared<dyn DriveBackend> = backend;
        *slot = Some(backend);
        Ok(self)
    }

    pub fn build(self) -> DiskIO {
        DiskIO { drives: self.drives }
    }
}

/// Routes each request to the backend bound to its drive and normalizes the outcome.
///
/// The table is fixed once built. Calls are synchronous and hold the backend
/// for their whole duration; requests to one drive never touch another.
pub struct DiskIO {
    drives: [Slot; NUM_DRIVES],
}

impl DiskIO {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn is_bound(&self, drive: DriveID) -> bool {
        self.backend(drive).is_some()
    }

    fn backend(&self, drive: DriveID) -> Option<&Shared<dyn DriveBackend>> {
        let backend = self.drives.get(drive.index()).and_then(Option::as_ref);
        if backend.is_none() {
            debug!("Drive {} not bound", drive);
        }
        backend
    }

    pub fn status(&self, drive: DriveID) -> DiskStatus {
        let Some(backend) = self.backend(drive) else { return DiskStatus::not_ready() };
        let raw = acquire!(backend).status();
        trace!("Drive {} status {:#x}", drive, raw);
        DiskStatus::from_raw(raw)
    }

    pub fn initialize(&self, drive: DriveID) -> DiskStatus {
        let Some(backend) = self.backend(drive) else { return DiskStatus::not_ready() };
        let raw = acquire!(backend).initialize();
        trace!("Drive {} initialize {:#x}", drive, raw);
        DiskStatus::from_raw(raw)
    }

    pub fn read(&self, drive: DriveID, buf: &mut [u8], sector: SectorID, count: usize) -> DiskResult {
        let Some(backend) = self.backend(drive) else { return DiskResult::ParameterError };
        let raw = acquire!(backend).read(buf, sector, count);
        trace!("Drive {} read {}+{} result {}", drive, sector, count, raw);
        DiskResult::from_raw(raw)
    }

    pub fn write(&self, drive: DriveID, buf: &[u8], sector: SectorID, count: usize) -> DiskResult {
        let Some(backend) = self.backend(drive) else { return DiskResult::ParameterError };
        let raw = acquire!(backend).write(buf, sector, count);
        trace!("Drive {} write {}+{} result {}", drive, sector, count, raw);
        DiskResult::from_raw(raw)
    }

    pub fn ioctl(&self, drive: DriveID, control: Control, buf: &mut [u8]) -> DiskResult {
        let Some(backend) = self.backend(drive) else { return DiskResult::ParameterError };
        let raw = acquire!(backend).ioctl(control, buf);
        trace!("Drive {} ioctl {:?} result {}", drive, control, raw);
        DiskResult::from_raw(raw)
    }
}
