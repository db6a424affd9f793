use bitfield::bitfield;
#[cfg(all(feature = "chrono", feature = "std"))]
use chrono::Local;
#[cfg(feature = "chrono")]
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use derive_more::{From, Into};

bitfield! {
    /// Packed local time the FAT engine stamps on files
    #[derive(Copy, Clone, Debug, Default, From, Into, PartialEq, Eq)]
    pub struct FatTime(u32);
    year_offset, set_year_offset: 31, 25;
    pub month, set_month: 24, 21;
    pub day, set_day: 20, 16;
    pub hour, set_hour: 15, 11;
    pub minute, set_minute: 10, 5;
    pub double_second, set_double_second: 4, 0;
}

impl FatTime {
    /// Year since 1980, representable until 2107
    pub fn year(&self) -> u32 {
        self.year_offset() + 1980
    }

    /// Years outside 1980..=2107 saturate to the nearest end
    pub fn set_year(&mut self, year: u32) {
        self.set_year_offset(year.clamp(1980, 2107) - 1980)
    }

    pub fn second(&self) -> u32 {
        self.double_second() * 2
    }

    pub fn set_second(&mut self, second: u32) {
        self.set_double_second(second / 2)
    }
}

#[cfg(feature = "extern-datetime-now")]
unsafe extern "Rust" {
    /// Provided by the integrator, usually backed by an RTC
    pub(crate) fn diskio_fattime_now() -> FatTime;
}

impl FatTime {
    pub fn now() -> Self {
        match () {
            #[cfg(feature = "extern-datetime-now")]
            () => unsafe { diskio_fattime_now() },
            #[cfg(all(not(feature = "extern-datetime-now"), feature = "chrono", feature = "std"))]
            () => Local::now().naive_local().into(),
            #[cfg(not(any(feature = "extern-datetime-now", all(feature = "chrono", feature = "std"))))]
            () => Self::default(),
        }
    }
}

/// Current time as the packed u32 the FAT engine expects
pub fn fattime() -> u32 {
    FatTime::now().into()
}

#[cfg(feature = "chrono")]
impl From<FatTime> for NaiveDateTime {
    fn from(time: FatTime) -> Self {
        let date = NaiveDate::from_ymd_opt(time.year() as i32, time.month(), time.day());
        let time = NaiveTime::from_hms_opt(time.hour(), time.minute(), time.second());
        NaiveDateTime::new(date.unwrap_or_default(), time.unwrap_or_default())
    }
}

#[cfg(feature = "chrono")]
impl From<NaiveDateTime> for FatTime {
    fn from(datetime: NaiveDateTime) -> Self {
        let mut time = Self::default();
        time.set_year(datetime.year() as u32);
        time.set_month(datetime.month());
        time.set_day(datetime.day());
        time.set_hour(datetime.hour());
        time.set_minute(datetime.minute());
        time.set_second(datetime.second());
        time
    }
}

#[cfg(test)]
mod test {
    use super::FatTime;

    #[test]
    fn test_packing() {
        let mut time = FatTime::default();
        time.set_year(2024);
        time.set_month(2);
        time.set_day(29);
        time.set_hour(23);
        time.set_minute(59);
        time.set_second(59);
        let packed = u32::from(time);
        assert_eq!(packed >> 25, 44);
        assert_eq!((packed >> 21) & 0xF, 2);
        assert_eq!((packed >> 16) & 0x1F, 29);
        assert_eq!(packed & 0x1F, 29);
        let time = FatTime::from(packed);
        assert_eq!((time.year(), time.hour(), time.minute(), time.second()), (2024, 23, 59, 58));
    }

    #[test]
    fn test_year_saturates() {
        let mut time = FatTime::default();
        time.set_month(6);
        time.set_year(2200);
        assert_eq!(time.year(), 2107);
        assert_eq!(time.month(), 6);
        time.set_year(1970);
        assert_eq!(time.year(), 1980);
        time.set_year(2107);
        assert_eq!(time.year(), 2107);
    }

    #[cfg(feature = "chrono")]
    #[test]
    fn test_chrono() {
        use chrono::NaiveDate;

        let date = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        let datetime = date.and_hms_opt(8, 30, 14).unwrap();
        let time = FatTime::from(datetime);
        assert_eq!(time.year(), 1999);
        assert_eq!(chrono::NaiveDateTime::from(time), datetime);
    }

    #[cfg(all(feature = "chrono", feature = "std", not(feature = "extern-datetime-now")))]
    #[test]
    fn test_now_from_clock() {
        assert!(FatTime::now().year() >= 2024);
    }
}
