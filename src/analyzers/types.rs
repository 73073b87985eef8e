//! Data types used by the aggregation pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Calendar bucket (`YYYY-MM`) a row is aggregated under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MonthKey(String);

impl MonthKey {
    /// Derives the key from a `DD-MM-YYYY` date.
    ///
    /// Returns `None` unless the date splits on `-` into exactly three parts.
    /// Month and year are taken as written; `15-13-2099` yields `2099-13`.
    pub fn from_date(date: &str) -> Option<Self> {
        let mut parts = date.split('-');
        let (_day, month, year) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }
        Some(MonthKey(format!("{year}-{month}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Enrolment counts per age band. Sums saturate at `u64::MAX`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnrolmentCounts {
    pub age_0_5: u64,
    pub age_5_17: u64,
    pub age_18_above: u64,
}

impl EnrolmentCounts {
    pub fn add(&mut self, other: &EnrolmentCounts) {
        self.age_0_5 = self.age_0_5.saturating_add(other.age_0_5);
        self.age_5_17 = self.age_5_17.saturating_add(other.age_5_17);
        self.age_18_above = self.age_18_above.saturating_add(other.age_18_above);
    }
}

/// Counts per age band for the biometric and demographic update categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpdateCounts {
    pub age_5_17: u64,
    pub age_17_above: u64,
}

impl UpdateCounts {
    pub fn add(&mut self, other: &UpdateCounts) {
        self.age_5_17 = self.age_5_17.saturating_add(other.age_5_17);
        self.age_17_above = self.age_17_above.saturating_add(other.age_17_above);
    }
}

/// Running totals for one (month, pincode) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateRecord {
    pub state: String,
    pub district: String,
    pub enrolment: EnrolmentCounts,
    pub biometric: UpdateCounts,
    pub demographic: UpdateCounts,
}

impl AggregateRecord {
    /// Empty metadata and every counter at zero.
    pub fn new() -> Self {
        AggregateRecord {
            state: String::new(),
            district: String::new(),
            enrolment: EnrolmentCounts {
                age_0_5: 0,
                age_5_17: 0,
                age_18_above: 0,
            },
            biometric: UpdateCounts {
                age_5_17: 0,
                age_17_above: 0,
            },
            demographic: UpdateCounts {
                age_5_17: 0,
                age_17_above: 0,
            },
        }
    }
}

impl Default for AggregateRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// The three category blocks nested under `data` in an exported record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryData {
    pub enrolment: EnrolmentCounts,
    pub biometric_update: UpdateCounts,
    pub demographic_update: UpdateCounts,
}

/// One exported entry: a pincode's totals for a month, joined with its locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PincodeRecord {
    pub pincode: String,
    pub month: MonthKey,
    pub state: String,
    pub district: String,
    pub locations: Vec<String>,
    pub data: CategoryData,
}

/// All records for a single month, written as `aadhaar_data_<month>.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyDocument {
    pub month: MonthKey,
    pub records: Vec<PincodeRecord>,
}

/// Summary entry for the month index listing.
#[derive(Debug, Clone, Serialize)]
pub struct MonthIndexEntry {
    pub month: MonthKey,
    pub file: String,
    pub records: usize,
}

/// Index of every exported month, served as `months.json`.
#[derive(Debug, Clone, Serialize)]
pub struct MonthIndex {
    pub generated_at: DateTime<Utc>,
    pub months: Vec<MonthIndexEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_key_uses_year_then_month() {
        let key = MonthKey::from_date("07-03-2025").unwrap();
        assert_eq!(key.as_str(), "2025-03");
    }

    #[test]
    fn test_month_key_is_not_calendar_checked() {
        let key = MonthKey::from_date("15-13-2099").unwrap();
        assert_eq!(key.to_string(), "2099-13");
    }

    #[test]
    fn test_month_key_rejects_wrong_part_count() {
        assert!(MonthKey::from_date("2025-03").is_none());
        assert!(MonthKey::from_date("01-03-2025-x").is_none());
        assert!(MonthKey::from_date("01/03/2025").is_none());
        assert!(MonthKey::from_date("").is_none());
    }

    #[test]
    fn test_new_record_is_zeroed() {
        let record = AggregateRecord::new();
        assert!(record.state.is_empty());
        assert!(record.district.is_empty());
        assert_eq!(record.enrolment, EnrolmentCounts::default());
        assert_eq!(record.biometric, UpdateCounts::default());
        assert_eq!(record.demographic, UpdateCounts::default());
    }

    #[test]
    fn test_counts_add() {
        let mut counts = UpdateCounts {
            age_5_17: 1,
            age_17_above: 2,
        };
        counts.add(&UpdateCounts {
            age_5_17: 10,
            age_17_above: 20,
        });
        assert_eq!(counts.age_5_17, 11);
        assert_eq!(counts.age_17_above, 22);
    }

    #[test]
    fn test_counts_saturate_instead_of_wrapping() {
        let mut enrolment = EnrolmentCounts {
            age_0_5: u64::MAX,
            ..Default::default()
        };
        enrolment.add(&EnrolmentCounts {
            age_0_5: 1,
            age_5_17: 2,
            age_18_above: 0,
        });
        assert_eq!(enrolment.age_0_5, u64::MAX);
        assert_eq!(enrolment.age_5_17, 2);

        let mut update = UpdateCounts {
            age_5_17: 0,
            age_17_above: u64::MAX - 1,
        };
        update.add(&UpdateCounts {
            age_5_17: 0,
            age_17_above: 5,
        });
        assert_eq!(update.age_17_above, u64::MAX);
    }

    #[test]
    fn test_pincode_record_json_layout() {
        let record = PincodeRecord {
            pincode: "560001".to_string(),
            month: MonthKey::from_date("01-03-2025").unwrap(),
            state: "Karnataka".to_string(),
            district: "Bengaluru Urban".to_string(),
            locations: vec!["Bangalore North".to_string()],
            data: CategoryData {
                enrolment: EnrolmentCounts {
                    age_0_5: 1,
                    age_5_17: 2,
                    age_18_above: 3,
                },
                biometric_update: UpdateCounts::default(),
                demographic_update: UpdateCounts {
                    age_5_17: 4,
                    age_17_above: 5,
                },
            },
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["month"], "2025-03");
        assert_eq!(value["locations"][0], "Bangalore North");
        assert_eq!(value["data"]["enrolment"]["age_18_above"], 3);
        assert_eq!(value["data"]["biometric_update"]["age_17_above"], 0);
        assert_eq!(value["data"]["demographic_update"]["age_5_17"], 4);
    }
}
