//! Row parser for the enrolment, biometric and demographic CSV files.
//!
//! Each CSV row is deserialized into a typed [`RawRow`] and normalized into an
//! [`Observation`]. Rows without a usable date or pincode are skipped; bad
//! numeric cells only ever count as zero.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::io::Read;
use thiserror::Error;

use crate::analyzers::types::{EnrolmentCounts, MonthKey, UpdateCounts};

/// Input record category. Each has its own columns and accumulator slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Enrolment,
    Biometric,
    Demographic,
}

impl Category {
    /// Processing order of the pipeline.
    pub const ALL: [Category; 3] = [
        Category::Enrolment,
        Category::Biometric,
        Category::Demographic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Enrolment => "enrolment",
            Category::Biometric => "biometric",
            Category::Demographic => "demographic",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single row as read from any of the category CSVs.
///
/// Columns absent from a file deserialize as empty strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRow {
    pub date: String,
    pub pincode: String,
    pub state: String,
    pub district: String,

    // enrolment
    pub age_0_5: String,
    pub age_5_17: String,
    pub age_18_greater: String,

    // biometric update
    pub bio_age_5_17: String,
    pub bio_age_17_: String,

    // demographic update
    pub demo_age_5_17: String,
    pub demo_age_17_: String,
}

/// Per-row counts for exactly one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delta {
    Enrolment(EnrolmentCounts),
    Biometric(UpdateCounts),
    Demographic(UpdateCounts),
}

impl Delta {
    pub fn category(&self) -> Category {
        match self {
            Delta::Enrolment(_) => Category::Enrolment,
            Delta::Biometric(_) => Category::Biometric,
            Delta::Demographic(_) => Category::Demographic,
        }
    }
}

/// A normalized row, ready to be merged into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub month: MonthKey,
    pub pincode: String,
    pub state: String,
    pub district: String,
    pub delta: Delta,
}

/// Why a row was dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    #[error("row has no date")]
    MissingDate,

    #[error("date is not DD-MM-YYYY: {0}")]
    MalformedDate(String),

    #[error("row has no pincode")]
    MissingPincode,
}

/// Normalizes one row of the given category.
///
/// # Errors
///
/// Returns a [`Skip`] if the date is missing or does not have three `-`
/// separated parts, or if the pincode is blank.
pub fn parse_row(category: Category, row: &RawRow) -> Result<Observation, Skip> {
    if row.date.is_empty() {
        return Err(Skip::MissingDate);
    }
    let month =
        MonthKey::from_date(&row.date).ok_or_else(|| Skip::MalformedDate(row.date.clone()))?;

    let pincode = row.pincode.trim();
    if pincode.is_empty() {
        return Err(Skip::MissingPincode);
    }

    let delta = match category {
        Category::Enrolment => Delta::Enrolment(EnrolmentCounts {
            age_0_5: parse_int_or_zero(&row.age_0_5),
            age_5_17: parse_int_or_zero(&row.age_5_17),
            age_18_above: parse_int_or_zero(&row.age_18_greater),
        }),
        Category::Biometric => Delta::Biometric(UpdateCounts {
            age_5_17: parse_int_or_zero(&row.bio_age_5_17),
            age_17_above: parse_int_or_zero(&row.bio_age_17_),
        }),
        Category::Demographic => Delta::Demographic(UpdateCounts {
            age_5_17: parse_int_or_zero(&row.demo_age_5_17),
            age_17_above: parse_int_or_zero(&row.demo_age_17_),
        }),
    };

    Ok(Observation {
        month,
        pincode: pincode.to_string(),
        state: row.state.clone(),
        district: row.district.clone(),
        delta,
    })
}

/// Deserializes each data row of a headed CSV and hands it to `f`.
///
/// Rows shorter than the header are padded with empty cells, so columns
/// missing from a row read the same as empty ones.
pub fn for_each_row<R, T, F>(reader: R, mut f: F) -> csv::Result<()>
where
    R: Read,
    T: DeserializeOwned,
    F: FnMut(T),
{
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut record = csv::StringRecord::new();
    while rdr.read_record(&mut record)? {
        while record.len() < headers.len() {
            record.push_field("");
        }
        f(record.deserialize(Some(&headers))?);
    }

    Ok(())
}

/// Parses a count cell, surrounding whitespace allowed.
/// Anything that is not a non-negative integer counts as zero.
pub fn parse_int_or_zero(value: &str) -> u64 {
    value.trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, pincode: &str) -> RawRow {
        RawRow {
            date: date.to_string(),
            pincode: pincode.to_string(),
            state: "Karnataka".to_string(),
            district: "Bengaluru Urban".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_int_or_zero() {
        assert_eq!(parse_int_or_zero("12"), 12);
        assert_eq!(parse_int_or_zero(" 7 "), 7);
        assert_eq!(parse_int_or_zero(""), 0);
        assert_eq!(parse_int_or_zero("abc"), 0);
        assert_eq!(parse_int_or_zero("1.5"), 0);
        assert_eq!(parse_int_or_zero("-3"), 0);
    }

    #[test]
    fn test_enrolment_bad_numbers_count_as_zero() {
        let mut raw = row("01-03-2025", "500001");
        raw.age_0_5 = "12".to_string();
        raw.age_5_17 = "abc".to_string();

        let obs = parse_row(Category::Enrolment, &raw).unwrap();
        assert_eq!(
            obs.delta,
            Delta::Enrolment(EnrolmentCounts {
                age_0_5: 12,
                age_5_17: 0,
                age_18_above: 0,
            })
        );
        assert_eq!(obs.month.as_str(), "2025-03");
    }

    #[test]
    fn test_missing_date_is_skipped() {
        let raw = row("", "560001");
        assert_eq!(
            parse_row(Category::Enrolment, &raw),
            Err(Skip::MissingDate)
        );
    }

    #[test]
    fn test_malformed_date_is_skipped() {
        let raw = row("2025/03/01", "560001");
        assert!(matches!(
            parse_row(Category::Biometric, &raw),
            Err(Skip::MalformedDate(_))
        ));
    }

    #[test]
    fn test_impossible_month_is_kept() {
        let raw = row("15-13-2099", "560001");
        let obs = parse_row(Category::Demographic, &raw).unwrap();
        assert_eq!(obs.month.as_str(), "2099-13");
    }

    #[test]
    fn test_blank_pincode_is_skipped() {
        let raw = row("01-03-2025", "   ");
        assert_eq!(
            parse_row(Category::Enrolment, &raw),
            Err(Skip::MissingPincode)
        );
    }

    #[test]
    fn test_pincode_is_trimmed_metadata_is_not() {
        let mut raw = row("01-03-2025", " 560001 ");
        raw.state = " Karnataka".to_string();

        let obs = parse_row(Category::Enrolment, &raw).unwrap();
        assert_eq!(obs.pincode, "560001");
        assert_eq!(obs.state, " Karnataka");
    }

    #[test]
    fn test_category_reads_only_its_columns() {
        let mut raw = row("01-03-2025", "560001");
        raw.age_5_17 = "9".to_string();
        raw.bio_age_5_17 = "4".to_string();
        raw.bio_age_17_ = "6".to_string();
        raw.demo_age_5_17 = "100".to_string();

        let obs = parse_row(Category::Biometric, &raw).unwrap();
        assert_eq!(obs.delta.category(), Category::Biometric);
        assert_eq!(
            obs.delta,
            Delta::Biometric(UpdateCounts {
                age_5_17: 4,
                age_17_above: 6,
            })
        );
    }

    #[test]
    fn test_demographic_columns() {
        let mut raw = row("01-03-2025", "560001");
        raw.demo_age_5_17 = "3".to_string();
        raw.demo_age_17_ = "8".to_string();

        let obs = parse_row(Category::Demographic, &raw).unwrap();
        assert_eq!(
            obs.delta,
            Delta::Demographic(UpdateCounts {
                age_5_17: 3,
                age_17_above: 8,
            })
        );
    }

    #[test]
    fn test_raw_row_from_csv_with_missing_columns() {
        let data = "date,state,district,pincode,age_0_5\n01-03-2025,Goa,North Goa,403001,5\n";
        let mut rdr = csv::Reader::from_reader(data.as_bytes());
        let raw: RawRow = rdr.deserialize().next().unwrap().unwrap();

        assert_eq!(raw.pincode, "403001");
        assert_eq!(raw.age_0_5, "5");
        assert_eq!(raw.age_18_greater, "");
    }

    #[test]
    fn test_for_each_row_pads_short_rows() {
        let data = "\
date,state,district,pincode,age_0_5,age_5_17,age_18_greater
01-03-2025,Goa,North Goa,403001,12,abc
";
        let mut rows = Vec::new();
        for_each_row(data.as_bytes(), |row: RawRow| rows.push(row)).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].age_5_17, "abc");
        assert_eq!(rows[0].age_18_greater, "");

        let obs = parse_row(Category::Enrolment, &rows[0]).unwrap();
        assert_eq!(
            obs.delta,
            Delta::Enrolment(EnrolmentCounts {
                age_0_5: 12,
                age_5_17: 0,
                age_18_above: 0,
            })
        );
    }
}
