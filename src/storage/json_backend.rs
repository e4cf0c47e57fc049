use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::errors::{PortalError, Result};
use crate::utils::paths::write_atomic;

use super::{ApplicationMap, ApplicationStore};

/// Stores the whole application collection as one pretty-printed JSON object.
#[derive(Debug, Clone)]
pub struct JsonApplicationStore {
    path: PathBuf,
}

impl JsonApplicationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ApplicationStore for JsonApplicationStore {
    fn load_all(&self) -> Result<ApplicationMap> {
        if !self.path.exists() {
            return Ok(ApplicationMap::new());
        }
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(ApplicationMap::new());
        }
        serde_json::from_str(&data).map_err(|err| {
            PortalError::Storage(format!(
                "application store `{}` is unreadable: {}",
                self.path.display(),
                err
            ))
        })
    }

    fn save_all(&self, applications: &ApplicationMap) -> Result<()> {
        let json = serde_json::to_string_pretty(applications)?;
        write_atomic(&self.path, &json)?;
        tracing::debug!(
            path = %self.path.display(),
            count = applications.len(),
            "application store written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ApplicationKind, ApplicationRecord, ApplicationStatus, DocumentTally, StoredApplication,
    };
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn sample(id: &str) -> StoredApplication {
        StoredApplication {
            id: id.into(),
            kind: ApplicationKind::Sar,
            applicant_name: "Musa Danjuma".into(),
            email: "musa@example.com".into(),
            membership_type: None,
            status: ApplicationStatus::PendingReview,
            submitted_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
            documents: DocumentTally {
                uploaded: 3,
                required: 3,
            },
            review_notes: None,
            membership_id: None,
            reviewed_at: None,
            form_data: ApplicationRecord::new(),
        }
    }

    #[test]
    fn missing_file_is_an_empty_collection() {
        let dir = tempdir().unwrap();
        let store = JsonApplicationStore::new(dir.path().join("applications.json"));
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn collection_is_keyed_by_application_id() {
        let dir = tempdir().unwrap();
        let store = JsonApplicationStore::new(dir.path().join("applications.json"));
        store.insert(sample("APP-20260301-AAAAAA")).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["APP-20260301-AAAAAA"]["status"], "pending_review");
        assert_eq!(json["APP-20260301-AAAAAA"]["kind"], "sar");
    }

    #[test]
    fn corrupt_file_reports_storage_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("applications.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonApplicationStore::new(path);
        assert!(matches!(store.load_all(), Err(PortalError::Storage(_))));
    }

    #[test]
    fn update_requires_existing_record() {
        let dir = tempdir().unwrap();
        let store = JsonApplicationStore::new(dir.path().join("applications.json"));
        assert!(matches!(
            store.update(sample("APP-20260301-BBBBBB")),
            Err(PortalError::NotFound(_))
        ));
    }
}
