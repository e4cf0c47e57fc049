//! Back-office review workflow over stored applications.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::domain::{
    generate_membership_id, ApplicationKind, ApplicationStatus, StoredApplication,
};
use crate::errors::{PortalError, Result};
use crate::storage::ApplicationStore;

const MAX_ID_ATTEMPTS: usize = 16;

/// Dashboard counts across the whole store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewStatistics {
    pub total: usize,
    pub by_status: BTreeMap<ApplicationStatus, usize>,
    pub by_kind: BTreeMap<ApplicationKind, usize>,
}

impl ReviewStatistics {
    pub fn status_count(&self, status: ApplicationStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    pub fn kind_count(&self, kind: ApplicationKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }
}

/// Applies status transitions to applications held in an [`ApplicationStore`].
pub struct ReviewService<'s> {
    store: &'s dyn ApplicationStore,
}

impl<'s> ReviewService<'s> {
    pub fn new(store: &'s dyn ApplicationStore) -> Self {
        Self { store }
    }

    /// Marks the applicant's email as confirmed.
    pub fn confirm_email(&self, id: &str) -> Result<StoredApplication> {
        self.transition(id, "confirm email for", |app| {
            require_status(app, &[ApplicationStatus::PendingEmail])?;
            app.status = ApplicationStatus::PendingReview;
            Ok(())
        })
    }

    /// Sends the application back to the applicant with reviewer notes.
    pub fn request_revision(&self, id: &str, notes: &str) -> Result<StoredApplication> {
        let notes = require_notes(notes)?;
        self.transition(id, "request revision of", |app| {
            require_status(app, &[ApplicationStatus::PendingReview])?;
            app.status = ApplicationStatus::RevisionRequested;
            app.review_notes = Some(notes);
            Ok(())
        })
    }

    /// Returns a revised application to the review queue.
    pub fn resubmit(&self, id: &str) -> Result<StoredApplication> {
        self.transition(id, "resubmit", |app| {
            require_status(app, &[ApplicationStatus::RevisionRequested])?;
            app.status = ApplicationStatus::PendingReview;
            Ok(())
        })
    }

    /// Approves the application. Membership applications receive a membership ID
    /// not already held by another stored application.
    pub fn approve(&self, id: &str) -> Result<StoredApplication> {
        let mut all = self.store.load_all()?;
        let app = all
            .get(id)
            .ok_or_else(|| PortalError::NotFound(id.to_string()))?;
        require_status(app, &[ApplicationStatus::PendingReview]).map_err(|from| {
            PortalError::InvalidTransition {
                id: id.to_string(),
                from,
                action: "approve",
            }
        })?;

        let membership_id = if app.kind == ApplicationKind::Membership {
            let mut issued = None;
            for _ in 0..MAX_ID_ATTEMPTS {
                let candidate = generate_membership_id();
                let taken = all
                    .values()
                    .any(|other| other.membership_id.as_deref() == Some(candidate.as_str()));
                if !taken {
                    issued = Some(candidate);
                    break;
                }
            }
            Some(issued.ok_or_else(|| {
                PortalError::Storage("could not allocate a unique membership id".into())
            })?)
        } else {
            None
        };

        let updated = match all.get_mut(id) {
            Some(app) => {
                app.status = ApplicationStatus::Approved;
                app.membership_id = membership_id;
                app.reviewed_at = Some(Utc::now());
                app.clone()
            }
            None => return Err(PortalError::NotFound(id.to_string())),
        };
        self.store.save_all(&all)?;
        tracing::info!(
            id = %updated.id,
            membership_id = updated.membership_id.as_deref().unwrap_or("-"),
            "application approved"
        );
        Ok(updated)
    }

    /// Rejects an application under review or awaiting revision.
    pub fn reject(&self, id: &str, notes: &str) -> Result<StoredApplication> {
        let notes = require_notes(notes)?;
        self.transition(id, "reject", |app| {
            require_status(
                app,
                &[
                    ApplicationStatus::PendingReview,
                    ApplicationStatus::RevisionRequested,
                ],
            )?;
            app.status = ApplicationStatus::Rejected;
            app.review_notes = Some(notes);
            Ok(())
        })
    }

    pub fn statistics(&self) -> Result<ReviewStatistics> {
        let mut stats = ReviewStatistics::default();
        for app in self.store.load_all()?.values() {
            stats.total += 1;
            *stats.by_status.entry(app.status).or_insert(0) += 1;
            *stats.by_kind.entry(app.kind).or_insert(0) += 1;
        }
        Ok(stats)
    }

    fn transition<F>(&self, id: &str, action: &'static str, apply: F) -> Result<StoredApplication>
    where
        F: FnOnce(&mut StoredApplication) -> std::result::Result<(), ApplicationStatus>,
    {
        let mut app = self.store.get(id)?;
        let from = app.status;
        apply(&mut app).map_err(|from| PortalError::InvalidTransition {
            id: id.to_string(),
            from,
            action,
        })?;
        app.reviewed_at = Some(Utc::now());
        self.store.update(app.clone())?;
        tracing::info!(id = %app.id, from = %from, to = %app.status, "application reviewed");
        Ok(app)
    }
}

fn require_status(
    app: &StoredApplication,
    allowed: &[ApplicationStatus],
) -> std::result::Result<(), ApplicationStatus> {
    if allowed.contains(&app.status) {
        Ok(())
    } else {
        Err(app.status)
    }
}

fn require_notes(notes: &str) -> Result<String> {
    let trimmed = notes.trim();
    if trimmed.is_empty() {
        return Err(PortalError::InvalidInput("review notes are required".into()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{is_membership_id, ApplicationRecord, DocumentTally, MembershipType};
    use crate::storage::MemoryApplicationStore;

    fn stored(id: &str, kind: ApplicationKind, status: ApplicationStatus) -> StoredApplication {
        StoredApplication {
            id: id.to_string(),
            kind,
            applicant_name: "Chidi Okeke".into(),
            email: "chidi@example.com".into(),
            membership_type: (kind == ApplicationKind::Membership)
                .then_some(MembershipType::Graduate),
            status,
            submitted_at: Utc::now(),
            documents: DocumentTally {
                uploaded: 4,
                required: 4,
            },
            review_notes: None,
            membership_id: None,
            reviewed_at: None,
            form_data: ApplicationRecord::new(),
        }
    }

    fn store_with(apps: &[StoredApplication]) -> MemoryApplicationStore {
        let store = MemoryApplicationStore::new();
        for app in apps {
            store.insert(app.clone()).unwrap();
        }
        store
    }

    #[test]
    fn membership_moves_from_email_confirmation_to_approval() {
        let store = store_with(&[stored(
            "APP-1",
            ApplicationKind::Membership,
            ApplicationStatus::PendingEmail,
        )]);
        let review = ReviewService::new(&store);

        let confirmed = review.confirm_email("APP-1").unwrap();
        assert_eq!(confirmed.status, ApplicationStatus::PendingReview);

        let approved = review.approve("APP-1").unwrap();
        assert_eq!(approved.status, ApplicationStatus::Approved);
        assert!(approved.reviewed_at.is_some());
        let membership_id = approved.membership_id.expect("membership id issued");
        assert!(is_membership_id(&membership_id));
        assert_eq!(store.get("APP-1").unwrap().membership_id, Some(membership_id));
    }

    #[test]
    fn approving_sar_issues_no_membership_id() {
        let store = store_with(&[stored(
            "APP-2",
            ApplicationKind::Sar,
            ApplicationStatus::PendingReview,
        )]);
        let approved = ReviewService::new(&store).approve("APP-2").unwrap();
        assert_eq!(approved.membership_id, None);
    }

    #[test]
    fn approve_requires_pending_review() {
        let store = store_with(&[stored(
            "APP-3",
            ApplicationKind::Membership,
            ApplicationStatus::PendingEmail,
        )]);
        let err = ReviewService::new(&store).approve("APP-3").unwrap_err();
        assert!(
            matches!(
                err,
                PortalError::InvalidTransition {
                    from: ApplicationStatus::PendingEmail,
                    action: "approve",
                    ..
                }
            ),
            "unexpected error: {err:?}"
        );
        assert_eq!(
            store.get("APP-3").unwrap().status,
            ApplicationStatus::PendingEmail
        );
    }

    #[test]
    fn revision_round_trip_keeps_notes() {
        let store = store_with(&[stored(
            "APP-4",
            ApplicationKind::Eiar,
            ApplicationStatus::PendingReview,
        )]);
        let review = ReviewService::new(&store);

        let revised = review
            .request_revision("APP-4", "  Attach the hazard assessment ")
            .unwrap();
        assert_eq!(revised.status, ApplicationStatus::RevisionRequested);
        assert_eq!(
            revised.review_notes.as_deref(),
            Some("Attach the hazard assessment")
        );

        let back = review.resubmit("APP-4").unwrap();
        assert_eq!(back.status, ApplicationStatus::PendingReview);
    }

    #[test]
    fn reject_needs_notes_and_an_open_application() {
        let store = store_with(&[
            stored("APP-5", ApplicationKind::Sar, ApplicationStatus::RevisionRequested),
            stored("APP-6", ApplicationKind::Sar, ApplicationStatus::Approved),
        ]);
        let review = ReviewService::new(&store);

        assert!(matches!(
            review.reject("APP-5", "   "),
            Err(PortalError::InvalidInput(_))
        ));
        let rejected = review.reject("APP-5", "Incomplete survey").unwrap();
        assert_eq!(rejected.status, ApplicationStatus::Rejected);

        assert!(matches!(
            review.reject("APP-6", "Too late"),
            Err(PortalError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn unknown_application_is_not_found() {
        let store = MemoryApplicationStore::new();
        assert!(matches!(
            ReviewService::new(&store).resubmit("APP-404"),
            Err(PortalError::NotFound(_))
        ));
    }

    #[test]
    fn statistics_count_by_status_and_kind() {
        let store = store_with(&[
            stored("A", ApplicationKind::Membership, ApplicationStatus::PendingEmail),
            stored("B", ApplicationKind::Membership, ApplicationStatus::Approved),
            stored("C", ApplicationKind::Sar, ApplicationStatus::PendingReview),
            stored("D", ApplicationKind::Eiar, ApplicationStatus::PendingReview),
        ]);
        let stats = ReviewService::new(&store).statistics().unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.status_count(ApplicationStatus::PendingReview), 2);
        assert_eq!(stats.status_count(ApplicationStatus::Rejected), 0);
        assert_eq!(stats.kind_count(ApplicationKind::Membership), 2);
        assert_eq!(stats.kind_count(ApplicationKind::Eiar), 1);
    }
}
