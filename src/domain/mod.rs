pub mod application;
pub mod identifiers;
pub mod record;

pub use application::{
    ApplicationKind, ApplicationStatus, DocumentTally, MembershipType, StoredApplication,
};
pub use identifiers::{
    generate_application_id, generate_membership_id, is_application_id, is_membership_id,
    MEMBERSHIP_ID_PREFIX,
};
pub use record::{ApplicationRecord, FieldValue, FileHandle};
