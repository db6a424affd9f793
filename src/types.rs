use derive_more::{Display, From, Into};

/// Logical block address, unit is one 512-byte sector
#[derive(Copy, Clone, Debug, Default, Display, From, Into, Eq, Ord, PartialOrd, PartialEq, Hash)]
pub struct SectorID(u64);

impl SectorID {
    pub const MBR: Self = Self(0);

    /// Sector `count` blocks after this one, None on overflow
    pub fn checked_add(self, count: u64) -> Option<Self> {
        self.0.checked_add(count).map(Self)
    }
}

impl<I: Into<u64>> core::ops::Add<I> for SectorID {
    type Output = Self;

    fn add(self, rhs: I) -> Self {
        Self(self.0 + rhs.into())
    }
}

impl<I: Into<u64>> core::ops::AddAssign<I> for SectorID {
    fn add_assign(&mut self, rhs: I) {
        self.0 += rhs.into()
    }
}

/// Logical drive number as seen by the FAT engine
#[derive(Copy, Clone, Debug, Display, From, Into, Eq, Ord, PartialOrd, PartialEq, Hash)]
pub struct DriveID(u8);

impl DriveID {
    pub const RAM: Self = Self(0);
    pub const MMC: Self = Self(1);
    pub const USB: Self = Self(2);

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}
