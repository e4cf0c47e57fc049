use crate::domain::{ApplicationRecord, DocumentTally};
use crate::errors::Result;

use super::descriptor::WizardDescriptor;

/// High-level contract for application-specific wizards.
///
/// Implementations describe their steps, optionally pre-populate the record,
/// and turn a fully validated record into a typed output.
pub trait WizardFlow {
    type Output;

    /// Descriptor controlling step order and behaviour.
    fn descriptor(&self) -> &WizardDescriptor;

    /// Values used to pre-populate a fresh record.
    fn defaults(&self) -> ApplicationRecord {
        ApplicationRecord::new()
    }

    /// Builds the typed output once every step validates.
    fn commit(&self, record: &ApplicationRecord) -> Result<Self::Output>;
}

/// Everything handed to a [`SubmissionSink`] when a wizard completes.
///
/// `record` is the full answer set with password fields masked.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission<T> {
    pub data: T,
    pub record: ApplicationRecord,
    pub documents: DocumentTally,
}

/// External collaborator receiving completed wizards.
pub trait SubmissionSink<T> {
    type Receipt;

    fn accept(&mut self, submission: Submission<T>) -> Result<Self::Receipt>;
}
