//! Plain-text membership certificate preview.

use crate::domain::{ApplicationKind, ApplicationStatus, StoredApplication};
use crate::errors::{PortalError, Result};

const CERTIFICATE_WIDTH: usize = 60;

/// Renders the certificate for an approved membership application.
///
/// The issue date is the approval timestamp when present, otherwise the
/// submission date.
pub fn render_certificate(app: &StoredApplication, chapter_name: &str) -> Result<String> {
    if app.kind != ApplicationKind::Membership {
        return Err(PortalError::InvalidInput(format!(
            "`{}` is a {} application; certificates are issued for memberships only",
            app.id,
            app.kind.label()
        )));
    }
    if app.status != ApplicationStatus::Approved {
        return Err(PortalError::InvalidInput(format!(
            "`{}` is {}; only approved memberships have a certificate",
            app.id, app.status
        )));
    }
    let membership_id = app.membership_id.as_deref().ok_or_else(|| {
        PortalError::InvalidInput(format!("`{}` has no membership ID", app.id))
    })?;

    let category = app
        .membership_type
        .map(|kind| kind.label())
        .unwrap_or("Member");
    let issued = app.reviewed_at.unwrap_or(app.submitted_at).date_naive();

    let body = [
        "NIGERIAN INSTITUTE OF TOWN PLANNERS".to_string(),
        chapter_name.to_string(),
        String::new(),
        "CERTIFICATE OF MEMBERSHIP".to_string(),
        String::new(),
        "This is to certify that".to_string(),
        app.applicant_name.to_uppercase(),
        format!("is a registered {} member", category),
        String::new(),
        format!("Membership ID: {}", membership_id),
        format!("Issued: {}", issued.format("%d %B %Y")),
    ];

    let border = format!("+{}+", "=".repeat(CERTIFICATE_WIDTH));
    let mut lines = Vec::with_capacity(body.len() + 4);
    lines.push(border.clone());
    lines.push(framed(""));
    lines.extend(body.iter().map(|line| framed(line)));
    lines.push(framed(""));
    lines.push(border);
    Ok(lines.join("\n"))
}

fn framed(text: &str) -> String {
    let width = text.chars().count().min(CERTIFICATE_WIDTH);
    let left = (CERTIFICATE_WIDTH - width) / 2;
    let right = CERTIFICATE_WIDTH - width - left;
    let clipped: String = text.chars().take(CERTIFICATE_WIDTH).collect();
    format!("|{}{}{}|", " ".repeat(left), clipped, " ".repeat(right))
}
