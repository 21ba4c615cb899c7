use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{AsRefStr, Display, EnumString, VariantArray};
use time::{Date, Time, format_description::BorrowedFormatItem, macros::format_description};
use ulid::Ulid;

#[derive(
    EnumString,
    VariantArray,
    Display,
    AsRefStr,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
)]
pub enum Category {
    Conference,
    Workshop,
    Seminar,
    Webinar,
    Meetup,
    Concert,
    Festival,
    Networking,
    #[strum(serialize = "Trade Show")]
    #[serde(rename = "Trade Show")]
    TradeShow,
    Sports,
}

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[hour]:[minute]");
const TIME_SECONDS_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[hour]:[minute]:[second]");

/// Calendar day of an event, `YYYY-MM-DD` on the wire and in storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventDate(pub Date);

impl FromStr for EventDate {
    type Err = time::error::Parse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // accept full ISO timestamps, keeping the day only
        let day = match s.get(..10) {
            Some(day) if s.as_bytes().get(10) == Some(&b'T') => day,
            _ => s,
        };

        Date::parse(day, DATE_FORMAT).map(Self)
    }
}

impl fmt::Display for EventDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self.0.format(DATE_FORMAT).map_err(|_| fmt::Error)?;
        f.write_str(&formatted)
    }
}

/// Start time of an event, `HH:MM` on the wire and in storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventTime(pub Time);

impl FromStr for EventTime {
    type Err = time::error::Parse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Time::parse(s, TIME_FORMAT)
            .or_else(|_| Time::parse(s, TIME_SECONDS_FORMAT))
            .map(|time| Self(time.replace_second(0).unwrap_or(time)))
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self.0.format(TIME_FORMAT).map_err(|_| fmt::Error)?;
        f.write_str(&formatted)
    }
}

macro_rules! string_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = String::deserialize(deserializer)?;
                value.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

string_serde!(EventDate);
string_serde!(EventTime);

/// Set of user ids with unique membership. Membership is decided by comparing
/// `Ulid` values.
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct MemberSet(Vec<Ulid>);

impl MemberSet {
    pub fn contains(&self, id: &Ulid) -> bool {
        self.0.iter().any(|member| member == id)
    }

    pub fn insert(&mut self, id: Ulid) -> bool {
        if self.contains(&id) {
            return false;
        }

        self.0.push(id);
        true
    }

    pub fn remove(&mut self, id: &Ulid) -> bool {
        let before = self.0.len();
        self.0.retain(|member| member != id);

        before != self.0.len()
    }

    /// Adds `id` when absent, removes it when present. Returns whether `id` is
    /// a member afterwards.
    pub fn toggle(&mut self, id: Ulid) -> bool {
        if self.remove(&id) {
            return false;
        }

        self.0.push(id);
        true
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Ulid> for MemberSet {
    fn from_iter<T: IntoIterator<Item = Ulid>>(iter: T) -> Self {
        let mut set = Self::default();
        for id in iter {
            set.insert(id);
        }

        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_names() {
        assert_eq!(Category::TradeShow.to_string(), "Trade Show");
        assert_eq!(
            Category::from_str("Trade Show").unwrap(),
            Category::TradeShow
        );
        assert_eq!(Category::from_str("Concert").unwrap(), Category::Concert);
        assert!(Category::from_str("Picnic").is_err());
        assert_eq!(Category::VARIANTS.len(), 10);
        assert_eq!(
            serde_json::to_string(&Category::TradeShow).unwrap(),
            "\"Trade Show\""
        );
    }

    #[test]
    fn test_event_date() {
        let date = EventDate::from_str("2025-03-09").unwrap();
        assert_eq!(date.to_string(), "2025-03-09");

        let date = EventDate::from_str("2025-03-09T18:00:00.000Z").unwrap();
        assert_eq!(date.to_string(), "2025-03-09");

        assert!(EventDate::from_str("09/03/2025").is_err());
        assert!(EventDate::from_str("2025-02-30").is_err());
        assert!(EventDate::from_str("2025-01-31").unwrap() < date);
    }

    #[test]
    fn test_event_time() {
        let time = EventTime::from_str("09:05").unwrap();
        assert_eq!(time.to_string(), "09:05");

        let time = EventTime::from_str("18:30:15").unwrap();
        assert_eq!(time.to_string(), "18:30");

        assert!(EventTime::from_str("25:00").is_err());
        assert!(EventTime::from_str("9am").is_err());
        assert!(EventTime::from_str("08:00").unwrap() < time);
    }

    #[test]
    fn test_member_set() {
        let john = Ulid::new();
        let albert = Ulid::new();
        let mut set = MemberSet::default();

        assert!(set.insert(john));
        assert!(!set.insert(john));
        assert!(set.toggle(albert));
        assert_eq!(set.len(), 2);
        assert!(set.contains(&albert));

        assert!(!set.toggle(john));
        assert!(!set.contains(&john));
        assert!(!set.remove(&john));
        assert_eq!(set.len(), 1);

        let set: MemberSet = [john, john, albert].into_iter().collect();
        assert_eq!(set.len(), 2);
    }
}
