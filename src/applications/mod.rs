//! Concrete wizards for membership registration, SAR, and EIAR intake.

pub mod eiar;
pub mod intake;
pub mod registration;
pub mod sar;

use std::str::FromStr;

use crate::domain::{ApplicationRecord, FileHandle};
use crate::errors::{PortalError, Result};

pub use eiar::{EiarData, EiarWizard, ProjectType};
pub use intake::{ApplicationIntake, IntakeForm};
pub use registration::{RegistrationData, RegistrationWizard};
pub use sar::{LandUse, SarData, SarWizard};

// Commit helpers. Steps have already validated, so a miss here means the
// descriptor and the commit code disagree about a key.

fn required_text(record: &ApplicationRecord, key: &str) -> Result<String> {
    record
        .text(key)
        .map(str::to_string)
        .ok_or_else(|| PortalError::InvalidInput(format!("`{}` is missing", key)))
}

fn optional_text(record: &ApplicationRecord, key: &str) -> Option<String> {
    record.text(key).map(str::to_string)
}

fn required_file(record: &ApplicationRecord, key: &str) -> Result<FileHandle> {
    record
        .file(key)
        .cloned()
        .ok_or_else(|| PortalError::InvalidInput(format!("document `{}` is missing", key)))
}

fn optional_file(record: &ApplicationRecord, key: &str) -> Option<FileHandle> {
    record.file(key).cloned()
}

fn parsed<T: FromStr>(record: &ApplicationRecord, key: &str) -> Result<T> {
    let raw = required_text(record, key)?;
    raw.parse::<T>()
        .map_err(|_| PortalError::InvalidInput(format!("`{}` has an invalid value `{}`", key, raw)))
}
