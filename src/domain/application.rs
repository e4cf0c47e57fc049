use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::ApplicationRecord;

/// Which wizard produced an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationKind {
    Membership,
    Sar,
    Eiar,
}

impl ApplicationKind {
    pub const ALL: [ApplicationKind; 3] = [
        ApplicationKind::Membership,
        ApplicationKind::Sar,
        ApplicationKind::Eiar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationKind::Membership => "membership",
            ApplicationKind::Sar => "sar",
            ApplicationKind::Eiar => "eiar",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApplicationKind::Membership => "Membership registration",
            ApplicationKind::Sar => "Site Analysis Report",
            ApplicationKind::Eiar => "Environmental Impact Assessment Report",
        }
    }
}

impl fmt::Display for ApplicationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ApplicationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| format!("unknown application kind `{}`", s.trim()))
    }
}

/// Review lifecycle of a stored application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    PendingEmail,
    PendingReview,
    RevisionRequested,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::PendingEmail,
        ApplicationStatus::PendingReview,
        ApplicationStatus::RevisionRequested,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::PendingEmail => "pending_email",
            ApplicationStatus::PendingReview => "pending_review",
            ApplicationStatus::RevisionRequested => "revision_requested",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, ApplicationStatus::Approved | ApplicationStatus::Rejected)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("unknown application status `{}`", s.trim()))
    }
}

/// Membership grade selected at the start of registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipType {
    Student,
    Graduate,
    Probationer,
    Corporate,
    Fellow,
}

impl MembershipType {
    pub const ALL: [MembershipType; 5] = [
        MembershipType::Student,
        MembershipType::Graduate,
        MembershipType::Probationer,
        MembershipType::Corporate,
        MembershipType::Fellow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipType::Student => "student",
            MembershipType::Graduate => "graduate",
            MembershipType::Probationer => "probationer",
            MembershipType::Corporate => "corporate",
            MembershipType::Fellow => "fellow",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MembershipType::Student => "Student Member",
            MembershipType::Graduate => "Graduate Member",
            MembershipType::Probationer => "Probationer Member",
            MembershipType::Corporate => "Corporate Member (MNITP)",
            MembershipType::Fellow => "Fellow (FNITP)",
        }
    }
}

impl fmt::Display for MembershipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        MembershipType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| format!("unknown membership type `{}`", s.trim()))
    }
}

/// Uploaded versus required document count at submission time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTally {
    pub uploaded: usize,
    pub required: usize,
}

impl fmt::Display for DocumentTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.uploaded, self.required)
    }
}

/// Application as persisted in the store and shown in the back-office.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredApplication {
    pub id: String,
    pub kind: ApplicationKind,
    pub applicant_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_type: Option<MembershipType>,
    pub status: ApplicationStatus,
    pub submitted_at: DateTime<Utc>,
    pub documents: DocumentTally,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    pub form_data: ApplicationRecord,
}
