use std::sync::Mutex;

use crate::errors::{PortalError, Result};

use super::{ApplicationMap, ApplicationStore};

/// Volatile store used by tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryApplicationStore {
    applications: Mutex<ApplicationMap>,
}

impl MemoryApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ApplicationStore for MemoryApplicationStore {
    fn load_all(&self) -> Result<ApplicationMap> {
        self.applications
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| PortalError::Storage("application store lock poisoned".into()))
    }

    fn save_all(&self, applications: &ApplicationMap) -> Result<()> {
        let mut guard = self
            .applications
            .lock()
            .map_err(|_| PortalError::Storage("application store lock poisoned".into()))?;
        *guard = applications.clone();
        Ok(())
    }
}
