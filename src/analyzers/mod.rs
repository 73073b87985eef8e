//! Monthly aggregation of Aadhaar activity records.
//!
//! Streams the enrolment, biometric and demographic CSVs through the row
//! parser into an in-memory store of per-month, per-pincode totals, which the
//! exporter then writes out as one JSON document per month.

pub mod analyzer;
pub mod store;
pub mod types;
