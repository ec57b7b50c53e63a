use std::fmt;
use std::str::FromStr;

use tracing::debug;

use super::Operand;
use crate::parse::ParseError;
use crate::types::{BindKeyword, Expression, Keyword};

/// A day of the week, Sunday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Day {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Sun,
        Day::Mon,
        Day::Tue,
        Day::Wed,
        Day::Thu,
        Day::Fri,
        Day::Sat,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Day::Sun => "Sun",
            Day::Mon => "Mon",
            Day::Tue => "Tues",
            Day::Wed => "Wed",
            Day::Thu => "Thur",
            Day::Fri => "Fri",
            Day::Sat => "Sat",
        }
    }

    fn full_name(self) -> &'static str {
        match self {
            Day::Sun => "sunday",
            Day::Mon => "monday",
            Day::Tue => "tuesday",
            Day::Wed => "wednesday",
            Day::Thu => "thursday",
            Day::Fri => "friday",
            Day::Sat => "saturday",
        }
    }

    /// Case-insensitive; accepts the rendered abbreviation, the three letter
    /// abbreviation, or the full name.
    #[must_use]
    pub fn matching(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.into_iter().find(|day| {
            day.as_str().eq_ignore_ascii_case(text)
                || day.full_name()[..3].eq_ignore_ascii_case(text)
                || day.full_name().eq_ignore_ascii_case(text)
        })
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of days for `dayofweek`, always rendered in week order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, day: Day) -> Self {
        self.push(day);
        self
    }

    pub fn push(&mut self, day: Day) -> &mut Self {
        self.0 |= day.bit();
        self
    }

    pub fn remove(&mut self, day: Day) -> &mut Self {
        self.0 &= !day.bit();
        self
    }

    #[must_use]
    pub fn contains(&self, day: Day) -> bool {
        self.0 & day.bit() != 0
    }

    pub fn days(&self) -> impl Iterator<Item = Day> + '_ {
        Day::ALL.into_iter().filter(|day| self.contains(*day))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<Day> for DayOfWeek {
    fn from_iter<I: IntoIterator<Item = Day>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), DayOfWeek::with)
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("<invalid_days>");
        }
        let days: Vec<&str> = self.days().map(Day::as_str).collect();
        f.write_str(&days.join(","))
    }
}

impl FromStr for DayOfWeek {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(|token| {
                Day::matching(token).ok_or_else(|| ParseError::new(format!("unknown day '{token}'")))
            })
            .collect()
    }
}

impl Operand for DayOfWeek {
    fn keyword(&self) -> Option<Keyword> {
        Some(Keyword::Bind(BindKeyword::DayOfWeek))
    }

    fn expression(&self) -> Option<Expression> {
        (!self.is_zero()).then(|| Expression::Value(self.to_string()))
    }
}

equality_conditions!(DayOfWeek);

/// Time of day for `timeofday`, `0000` through `2400`.
///
/// ```
/// use aciv3::values::TimeOfDay;
///
/// let evening = TimeOfDay::new(17, 30).unwrap();
/// assert_eq!(evening.ge().to_string(), r#"timeofday >= "1730""#);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TimeOfDay(Option<u16>);

impl TimeOfDay {
    /// `None` unless `hour <= 23` and `minute <= 59`, or the time is `24:00`.
    #[must_use]
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        let valid = (hour <= 23 && minute <= 59) || (hour == 24 && minute == 0);
        valid.then(|| Self(Some(u16::from(hour) * 100 + u16::from(minute))))
    }

    /// Build from `HHMM` text. Malformed input gives the zero value.
    #[must_use]
    pub fn from_hhmm(text: &str) -> Self {
        text.parse().unwrap_or_else(|err: ParseError| {
            debug!(error = %err, "invalid time of day");
            Self::default()
        })
    }

    #[must_use]
    pub fn hour(&self) -> Option<u8> {
        self.0.and_then(|t| u8::try_from(t / 100).ok())
    }

    #[must_use]
    pub fn minute(&self) -> Option<u8> {
        self.0.and_then(|t| u8::try_from(t % 100).ok())
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(t) => write!(f, "{t:04}"),
            None => f.write_str("<invalid_time_of_day>"),
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let err = || ParseError::new(format!("invalid time of day '{s}': expected HHMM"));
        if text.len() != 4 || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let hour: u8 = text[..2].parse().map_err(|_| err())?;
        let minute: u8 = text[2..].parse().map_err(|_| err())?;
        Self::new(hour, minute).ok_or_else(err)
    }
}

impl Operand for TimeOfDay {
    fn keyword(&self) -> Option<Keyword> {
        Some(Keyword::Bind(BindKeyword::TimeOfDay))
    }

    fn expression(&self) -> Option<Expression> {
        self.0.map(|_| Expression::Value(self.to_string()))
    }
}

ordinal_conditions!(TimeOfDay);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_render_in_week_order() {
        let days = DayOfWeek::new().with(Day::Sat).with(Day::Mon).with(Day::Sun);
        assert_eq!(days.to_string(), "Sun,Mon,Sat");
        assert_eq!(days.len(), 3);
        assert_eq!(days.eq().to_string(), r#"dayofweek = "Sun,Mon,Sat""#);
    }

    #[test]
    fn parse_days() {
        let days: DayOfWeek = "thur, tues,FRIDAY,wed".parse().unwrap();
        assert_eq!(days.to_string(), "Tues,Wed,Thur,Fri");
        assert!("Mon,Funday".parse::<DayOfWeek>().is_err());
        assert!(DayOfWeek::new().eq().is_zero());
    }

    #[test]
    fn remove_days() {
        let mut days: DayOfWeek = Day::ALL.into_iter().collect();
        days.remove(Day::Sun).remove(Day::Sat);
        assert!(!days.contains(Day::Sun));
        assert_eq!(days.to_string(), "Mon,Tues,Wed,Thur,Fri");
    }

    #[test]
    fn times() {
        assert_eq!(TimeOfDay::new(0, 5).map(|t| t.to_string()), Some("0005".into()));
        assert_eq!(TimeOfDay::new(24, 0).map(|t| t.to_string()), Some("2400".into()));
        assert!(TimeOfDay::new(24, 1).is_none());
        assert!(TimeOfDay::new(12, 60).is_none());
        assert_eq!(TimeOfDay::from_hhmm("1730").hour(), Some(17));
        assert_eq!(TimeOfDay::from_hhmm("1730").minute(), Some(30));
        for bad in ["", "930", "2500", "12:30", "1260", "abcd"] {
            assert!(TimeOfDay::from_hhmm(bad).is_zero(), "{bad} should be rejected");
        }
    }

    #[test]
    fn time_operators() {
        let tod = TimeOfDay::from_hhmm("2400");
        assert_eq!(tod.lt().to_string(), r#"timeofday < "2400""#);
        assert_eq!(tod.operators().len(), 6);
        assert!(TimeOfDay::default().ge().is_zero());
    }
}
