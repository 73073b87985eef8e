//! Input and output locations for a pipeline run.

use std::path::{Path, PathBuf};

use crate::parser::Category;

/// Directory holding the three category folders.
pub const GIVEN_DATASET_DIR: &str = "given dataset";
/// Directory holding the pincode reference table.
pub const EXTERNAL_DATASET_DIR: &str = "external dataset";
pub const PINCODE_FILE: &str = "india_pincode.csv";
pub const OUTPUT_DIR: &str = "processed_json_monthly";

/// Paths read and written by [`crate::analyzers::analyzer::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub enrolment_dir: PathBuf,
    pub biometric_dir: PathBuf,
    pub demographic_dir: PathBuf,
    pub pincode_file: PathBuf,
    pub output_dir: PathBuf,
}

impl PipelineConfig {
    /// Standard dataset layout under `base_dir`:
    ///
    /// ```text
    /// <base_dir>/given dataset/aadhar_enrolment/*.csv
    /// <base_dir>/given dataset/aadhar_biometric/*.csv
    /// <base_dir>/given dataset/aadhar_demographic/*.csv
    /// <base_dir>/external dataset/india_pincode.csv
    /// <base_dir>/processed_json_monthly/
    /// ```
    pub fn from_base_dir(base_dir: impl AsRef<Path>) -> Self {
        let base_dir = base_dir.as_ref();
        let given = base_dir.join(GIVEN_DATASET_DIR);

        PipelineConfig {
            enrolment_dir: given.join(category_dir_name(Category::Enrolment)),
            biometric_dir: given.join(category_dir_name(Category::Biometric)),
            demographic_dir: given.join(category_dir_name(Category::Demographic)),
            pincode_file: base_dir.join(EXTERNAL_DATASET_DIR).join(PINCODE_FILE),
            output_dir: base_dir.join(OUTPUT_DIR),
        }
    }

    pub fn category_dir(&self, category: Category) -> &Path {
        match category {
            Category::Enrolment => &self.enrolment_dir,
            Category::Biometric => &self.biometric_dir,
            Category::Demographic => &self.demographic_dir,
        }
    }
}

fn category_dir_name(category: Category) -> String {
    format!("aadhar_{}", category.name())
}
