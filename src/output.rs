//! Monthly JSON export.
//!
//! Joins each month's aggregated totals with the pincode locations and writes
//! one `aadhaar_data_<month>.json` per month, plus a `months.json` index.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzers::store::AggregationStore;
use crate::analyzers::types::{
    AggregateRecord, CategoryData, MonthIndex, MonthIndexEntry, MonthKey, MonthlyDocument,
    PincodeRecord,
};
use crate::locations::LocationIndex;

/// File name of the month index written next to the monthly documents.
pub const MONTH_INDEX_FILE: &str = "months.json";

/// Output file name for a month's document.
pub fn document_file_name(month: &MonthKey) -> String {
    format!("aadhaar_data_{}.json", month)
}

/// Builds the document for `month` from its `(pincode, record)` entries.
///
/// Pincodes missing from `locations` get an empty location list.
pub fn export<'a, I>(month: &MonthKey, entries: I, locations: &LocationIndex) -> MonthlyDocument
where
    I: IntoIterator<Item = (&'a String, &'a AggregateRecord)>,
{
    let records = entries
        .into_iter()
        .map(|(pincode, record)| PincodeRecord {
            pincode: pincode.clone(),
            month: month.clone(),
            state: record.state.clone(),
            district: record.district.clone(),
            locations: locations.get(pincode).to_vec(),
            data: CategoryData {
                enrolment: record.enrolment,
                biometric_update: record.biometric,
                demographic_update: record.demographic,
            },
        })
        .collect();

    MonthlyDocument {
        month: month.clone(),
        records,
    }
}

/// Writes `document` into `output_dir` as a pretty-printed JSON array.
pub fn write_document(output_dir: &Path, document: &MonthlyDocument) -> Result<PathBuf> {
    let file_name = document_file_name(&document.month);
    let path = output_dir.join(&file_name);

    write_json(&path, &document.records)?;

    info!(
        file = %file_name,
        records = document.records.len(),
        "Created monthly document"
    );
    Ok(path)
}

/// Writes the month index into `output_dir`.
pub fn write_month_index(output_dir: &Path, index: &MonthIndex) -> Result<PathBuf> {
    let path = output_dir.join(MONTH_INDEX_FILE);
    write_json(&path, index)?;
    debug!(months = index.months.len(), "Month index written");
    Ok(path)
}

/// Exports every month in `store`, then the month index.
///
/// Creates `output_dir` if it does not exist. Months without observations
/// are never present in the store, so they produce no document.
pub fn export_all(
    store: &AggregationStore,
    locations: &LocationIndex,
    output_dir: &Path,
) -> Result<MonthIndex> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    let mut months = Vec::new();
    for (month, entries) in store.records_by_month() {
        let document = export(month, entries, locations);
        write_document(output_dir, &document)?;

        months.push(MonthIndexEntry {
            month: month.clone(),
            file: document_file_name(month),
            records: document.records.len(),
        });
    }

    let index = MonthIndex {
        generated_at: Utc::now(),
        months,
    };
    write_month_index(output_dir, &index)?;

    Ok(index)
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    to_writer_ascii_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Pretty-prints `value` with two-space indentation, escaping every
/// non-ASCII character as `\uXXXX`.
pub fn to_writer_ascii_pretty<W: Write>(writer: W, value: &impl Serialize) -> serde_json::Result<()> {
    let mut ser = serde_json::Serializer::with_formatter(writer, AsciiPrettyFormatter::default());
    value.serialize(&mut ser)
}

#[derive(Default)]
struct AsciiPrettyFormatter(PrettyFormatter<'static>);

impl Formatter for AsciiPrettyFormatter {
    fn write_string_fragment<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }

    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }
}
