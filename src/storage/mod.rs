pub mod json_backend;
pub mod memory;

use std::collections::BTreeMap;

use crate::domain::StoredApplication;
use crate::errors::{PortalError, Result};

pub use json_backend::JsonApplicationStore;
pub use memory::MemoryApplicationStore;

/// Application-id to application, as held by a store.
pub type ApplicationMap = BTreeMap<String, StoredApplication>;

/// Abstraction over backends holding the application collection.
///
/// Backends only need to load and overwrite the whole collection; every
/// write goes through [`ApplicationStore::save_all`].
pub trait ApplicationStore: Send + Sync {
    fn load_all(&self) -> Result<ApplicationMap>;
    fn save_all(&self, applications: &ApplicationMap) -> Result<()>;

    fn get(&self, id: &str) -> Result<StoredApplication> {
        self.load_all()?
            .remove(id)
            .ok_or_else(|| PortalError::NotFound(id.to_string()))
    }

    fn contains(&self, id: &str) -> Result<bool> {
        Ok(self.load_all()?.contains_key(id))
    }

    fn insert(&self, application: StoredApplication) -> Result<()> {
        let mut all = self.load_all()?;
        if all.contains_key(&application.id) {
            return Err(PortalError::InvalidInput(format!(
                "application `{}` already exists",
                application.id
            )));
        }
        all.insert(application.id.clone(), application);
        self.save_all(&all)
    }

    fn update(&self, application: StoredApplication) -> Result<()> {
        let mut all = self.load_all()?;
        match all.get_mut(&application.id) {
            Some(existing) => *existing = application,
            None => return Err(PortalError::NotFound(application.id)),
        }
        self.save_all(&all)
    }

    /// All applications, newest submission first.
    fn list(&self) -> Result<Vec<StoredApplication>> {
        let mut applications: Vec<StoredApplication> = self.load_all()?.into_values().collect();
        applications.sort_by(|a, b| {
            b.submitted_at
                .cmp(&a.submitted_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(applications)
    }
}
