use chrono::Utc;

use crate::domain::{
    generate_application_id, ApplicationKind, ApplicationStatus, MembershipType,
    StoredApplication,
};
use crate::errors::{PortalError, Result};
use crate::storage::ApplicationStore;
use crate::wizard::{Submission, SubmissionSink};

const MAX_ID_ATTEMPTS: usize = 8;

/// Summary fields every typed wizard output exposes to the store.
pub trait IntakeForm {
    fn kind(&self) -> ApplicationKind;
    fn applicant_name(&self) -> &str;
    fn email(&self) -> &str;

    fn membership_type(&self) -> Option<MembershipType> {
        None
    }

    fn initial_status(&self) -> ApplicationStatus {
        ApplicationStatus::PendingReview
    }
}

/// Submission sink that files completed wizards into an [`ApplicationStore`].
pub struct ApplicationIntake<'s> {
    store: &'s dyn ApplicationStore,
}

impl<'s> ApplicationIntake<'s> {
    pub fn new(store: &'s dyn ApplicationStore) -> Self {
        Self { store }
    }

    fn fresh_id(&self) -> Result<String> {
        let today = Utc::now().date_naive();
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = generate_application_id(today);
            if !self.store.contains(&candidate)? {
                return Ok(candidate);
            }
        }
        Err(PortalError::Storage(
            "could not allocate a unique application id".into(),
        ))
    }
}

impl<T: IntakeForm> SubmissionSink<T> for ApplicationIntake<'_> {
    type Receipt = StoredApplication;

    fn accept(&mut self, submission: Submission<T>) -> Result<StoredApplication> {
        let data = &submission.data;
        let application = StoredApplication {
            id: self.fresh_id()?,
            kind: data.kind(),
            applicant_name: data.applicant_name().to_string(),
            email: data.email().to_string(),
            membership_type: data.membership_type(),
            status: data.initial_status(),
            submitted_at: Utc::now(),
            documents: submission.documents,
            review_notes: None,
            membership_id: None,
            reviewed_at: None,
            form_data: submission.record,
        };
        self.store.insert(application.clone())?;
        tracing::info!(
            id = %application.id,
            kind = %application.kind,
            status = %application.status,
            "application filed"
        );
        Ok(application)
    }
}
