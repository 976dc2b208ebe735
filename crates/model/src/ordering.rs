use std::cmp::Ordering;

use chrono::Weekday;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::collate::natural_cmp;

use crate::{
    row::{DeliveryAlt, Row},
    WithId,
};

/// Which alternate delivery group is served on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum AltPreference {
    Alt1Preferred,
    Alt2Preferred,
}

/// Sunday, Monday, Wednesday and Friday serve `alt1`; the remaining days
/// serve `alt2`.
pub fn default_alt_preference(day: Weekday) -> AltPreference {
    match day {
        Weekday::Sun | Weekday::Mon | Weekday::Wed | Weekday::Fri => {
            AltPreference::Alt1Preferred
        }
        Weekday::Tue | Weekday::Thu | Weekday::Sat => AltPreference::Alt2Preferred,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrderingPolicy {
    pub preference: fn(Weekday) -> AltPreference,
}

impl Default for OrderingPolicy {
    fn default() -> Self {
        Self {
            preference: default_alt_preference,
        }
    }
}

impl OrderingPolicy {
    /// Sort rank of a delivery alternate: served rows first, the other
    /// alternate next, inactive rows last.
    fn rank(&self, alt: DeliveryAlt, preference: AltPreference) -> u8 {
        match (alt, preference) {
            (DeliveryAlt::Inactive, _) => 2,
            (DeliveryAlt::Normal, _) => 0,
            (DeliveryAlt::Alt1, AltPreference::Alt1Preferred) => 0,
            (DeliveryAlt::Alt2, AltPreference::Alt2Preferred) => 0,
            (DeliveryAlt::Alt1, AltPreference::Alt2Preferred) => 1,
            (DeliveryAlt::Alt2, AltPreference::Alt1Preferred) => 1,
        }
    }

    pub fn compare(&self, lhs: &Row, rhs: &Row, today: Weekday) -> Ordering {
        let preference = (self.preference)(today);
        self.rank(lhs.delivery_alt, preference)
            .cmp(&self.rank(rhs.delivery_alt, preference))
            .then_with(|| natural_cmp(&lhs.code, &rhs.code))
    }

    /// Returns the rows in delivery order for `today`. The sort is stable, so
    /// rows that compare equal keep their input order.
    pub fn order(&self, rows: &[WithId<Row>], today: Weekday) -> Vec<WithId<Row>> {
        let mut ordered = rows.to_vec();
        ordered.sort_by(|lhs, rhs| self.compare(&lhs.content, &rhs.content, today));
        ordered
    }
}

/// Orders rows with the default day mapping.
pub fn order_rows(rows: &[WithId<Row>], today: Weekday) -> Vec<WithId<Row>> {
    OrderingPolicy::default().order(rows, today)
}

/// Orders rows by code only.
pub fn sort_by_code(rows: &[WithId<Row>]) -> Vec<WithId<Row>> {
    let mut ordered = rows.to_vec();
    ordered.sort_by(|lhs, rhs| natural_cmp(&lhs.content.code, &rhs.content.code));
    ordered
}

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const EXPIRED_COLORS: [&str; 7] =
    ["Purple", "Pink", "Yellow", "Blue", "Orange", "Brown", "Green"];

pub fn day_name(day: Weekday) -> &'static str {
    DAY_NAMES[day.num_days_from_sunday() as usize]
}

/// Label of the alternate group that gets no delivery on `day`, e.g.
/// `Alt 2 (Monday)`.
pub fn delivery_off_label(day: Weekday, policy: &OrderingPolicy) -> String {
    let off = match (policy.preference)(day) {
        AltPreference::Alt1Preferred => "Alt 2",
        AltPreference::Alt2Preferred => "Alt 1",
    };
    format!("{} ({})", off, day_name(day))
}

/// Marker color that denotes expired stock on `day`.
pub fn expired_color(day: Weekday) -> &'static str {
    EXPIRED_COLORS[day.num_days_from_sunday() as usize]
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayNotice {
    pub day: u32,
    pub preference: AltPreference,
    pub delivery_off: String,
    pub expired_color: String,
}

impl DayNotice {
    pub fn for_day(day: Weekday, policy: &OrderingPolicy) -> Self {
        Self {
            day: day.num_days_from_sunday(),
            preference: (policy.preference)(day),
            delivery_off: delivery_off_label(day, policy),
            expired_color: expired_color(day).to_owned(),
        }
    }
}
