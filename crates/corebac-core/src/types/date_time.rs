use core::cmp::Ordering;

/// Octet value meaning "unspecified" in any date or time field.
pub const WILDCARD: u8 = 0xFF;

/// A BACnet Date: year offset from 1900, month, day of month, day of week
/// (1 = Monday .. 7 = Sunday). A field of 255 is a wildcard; the wildcard
/// year is therefore 2155.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Date {
    pub year_since_1900: u8,
    pub month: u8,
    pub day: u8,
    pub weekday: u8,
}

impl Date {
    pub const WILDCARD: Self = Self {
        year_since_1900: WILDCARD,
        month: WILDCARD,
        day: WILDCARD,
        weekday: WILDCARD,
    };

    /// Builds a date from a civil year/month/day, deriving the weekday.
    pub fn from_ymd(year: u16, month: u8, day: u8) -> Self {
        let mut date = Self {
            year_since_1900: (year.saturating_sub(1900)).min(254) as u8,
            month,
            day,
            weekday: 0,
        };
        date.weekday = ((date.day_number() % 7) + 1) as u8;
        date
    }

    pub const fn year(&self) -> u16 {
        1900 + self.year_since_1900 as u16
    }

    pub fn is_wildcard(&self) -> bool {
        self.year_since_1900 == WILDCARD
            && self.month == WILDCARD
            && self.day == WILDCARD
            && self.weekday == WILDCARD
    }

    /// Calendar ordering on year/month/day; the weekday octet is
    /// informational and does not participate.
    pub fn compare(&self, other: &Self) -> Ordering {
        (self.year_since_1900, self.month, self.day).cmp(&(
            other.year_since_1900,
            other.month,
            other.day,
        ))
    }

    /// Days since 1900-01-01 (which is day 0, a Monday).
    pub fn day_number(&self) -> u32 {
        let year = self.year();
        let mut days: u32 = 0;
        let mut y = 1900;
        while y < year {
            days += if is_leap_year(y) { 366 } else { 365 };
            y += 1;
        }
        let mut m = 1;
        while m < self.month {
            days += days_in_month(year, m) as u32;
            m += 1;
        }
        days + self.day.saturating_sub(1) as u32
    }

    /// Inverse of [`day_number`](Self::day_number), weekday included.
    pub fn from_day_number(mut days: u32) -> Self {
        let weekday = ((days % 7) + 1) as u8;
        let mut year: u16 = 1900;
        loop {
            let year_len = if is_leap_year(year) { 366 } else { 365 };
            if days < year_len {
                break;
            }
            days -= year_len;
            year += 1;
        }
        let mut month: u8 = 1;
        loop {
            let month_len = days_in_month(year, month) as u32;
            if days < month_len {
                break;
            }
            days -= month_len;
            month += 1;
        }
        Self {
            year_since_1900: (year - 1900) as u8,
            month,
            day: (days + 1) as u8,
            weekday,
        }
    }
}

pub fn is_leap_year(year: u16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

pub fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// A BACnet Time with hundredths resolution; 255 in any field is a wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Time {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub hundredths: u8,
}

impl Time {
    pub const WILDCARD: Self = Self {
        hour: WILDCARD,
        minute: WILDCARD,
        second: WILDCARD,
        hundredths: WILDCARD,
    };

    pub const MIDNIGHT: Self = Self {
        hour: 0,
        minute: 0,
        second: 0,
        hundredths: 0,
    };

    pub const fn new(hour: u8, minute: u8, second: u8, hundredths: u8) -> Self {
        Self {
            hour,
            minute,
            second,
            hundredths,
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.hour == WILDCARD
            && self.minute == WILDCARD
            && self.second == WILDCARD
            && self.hundredths == WILDCARD
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        (self.hour, self.minute, self.second, self.hundredths).cmp(&(
            other.hour,
            other.minute,
            other.second,
            other.hundredths,
        ))
    }
}

/// A combined Date and Time, compared date-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DateTime {
    pub date: Date,
    pub time: Time,
}

impl DateTime {
    pub const WILDCARD: Self = Self {
        date: Date::WILDCARD,
        time: Time::WILDCARD,
    };

    pub const fn new(date: Date, time: Time) -> Self {
        Self { date, time }
    }

    pub fn is_wildcard(&self) -> bool {
        self.date.is_wildcard() && self.time.is_wildcard()
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        self.date
            .compare(&other.date)
            .then(self.time.compare(&other.time))
    }

    pub fn is_before(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Less
    }

    /// Returns this moment shifted forward, rolling days, months, and years
    /// as needed. Seconds and hundredths are carried through unchanged.
    pub fn add_minutes(&self, minutes: u32) -> Self {
        let total = self.time.hour as u32 * 60 + self.time.minute as u32 + minutes;
        let day_carry = total / (24 * 60);
        let of_day = total % (24 * 60);
        Self {
            date: Date::from_day_number(self.date.day_number() + day_carry),
            time: Time {
                hour: (of_day / 60) as u8,
                minute: (of_day % 60) as u8,
                second: self.time.second,
                hundredths: self.time.hundredths,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Date, DateTime, Time};
    use core::cmp::Ordering;

    #[test]
    fn weekday_derivation_matches_known_dates() {
        // 1900-01-01 was a Monday, 2024-01-24 a Wednesday.
        assert_eq!(Date::from_ymd(1900, 1, 1).weekday, 1);
        assert_eq!(Date::from_ymd(2024, 1, 24).weekday, 3);
    }

    #[test]
    fn compare_ignores_weekday() {
        let mut a = Date::from_ymd(2024, 6, 1);
        let b = Date::from_ymd(2024, 6, 1);
        a.weekday = 7;
        assert_eq!(a.compare(&b), Ordering::Equal);
    }

    #[test]
    fn add_minutes_rolls_midnight() {
        let dt = DateTime::new(Date::from_ymd(2024, 1, 31), Time::new(23, 30, 0, 0));
        let shifted = dt.add_minutes(45);
        assert_eq!(shifted.date, Date::from_ymd(2024, 2, 1));
        assert_eq!(shifted.time, Time::new(0, 15, 0, 0));
    }

    #[test]
    fn add_minutes_crosses_leap_day() {
        let dt = DateTime::new(Date::from_ymd(2024, 2, 28), Time::new(12, 0, 0, 0));
        let shifted = dt.add_minutes(24 * 60);
        assert_eq!(shifted.date, Date::from_ymd(2024, 2, 29));

        let non_leap = DateTime::new(Date::from_ymd(2023, 2, 28), Time::new(12, 0, 0, 0));
        assert_eq!(
            non_leap.add_minutes(24 * 60).date,
            Date::from_ymd(2023, 3, 1)
        );
    }

    #[test]
    fn add_minutes_rolls_year() {
        let dt = DateTime::new(Date::from_ymd(1999, 12, 31), Time::new(23, 59, 0, 0));
        assert_eq!(dt.add_minutes(1).date, Date::from_ymd(2000, 1, 1));
    }

    #[test]
    fn wildcard_predicates() {
        assert!(DateTime::WILDCARD.is_wildcard());
        let real = DateTime::new(Date::from_ymd(2024, 1, 1), Time::MIDNIGHT);
        assert!(!real.is_wildcard());
        assert!(!DateTime::new(Date::WILDCARD, Time::MIDNIGHT).is_wildcard());
    }

    #[test]
    fn datetime_ordering_is_date_first() {
        let early = DateTime::new(Date::from_ymd(2024, 1, 1), Time::new(23, 0, 0, 0));
        let late = DateTime::new(Date::from_ymd(2024, 1, 2), Time::new(1, 0, 0, 0));
        assert!(early.is_before(&late));
        assert!(!late.is_before(&early));
    }
}
