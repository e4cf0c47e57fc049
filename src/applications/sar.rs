use std::fmt;
use std::str::FromStr;

use crate::domain::{ApplicationKind, ApplicationRecord, FileHandle};
use crate::errors::Result;
use crate::wizard::{
    ChoiceOption, FieldDescriptor, FieldKind, StepDescriptor, Validator, WizardDescriptor,
    WizardFlow,
};

use super::intake::IntakeForm;
use super::{optional_file, optional_text, parsed, required_file, required_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandUse {
    Residential,
    Commercial,
    Industrial,
    Institutional,
    MixedUse,
    Agricultural,
}

impl LandUse {
    pub const ALL: [LandUse; 6] = [
        LandUse::Residential,
        LandUse::Commercial,
        LandUse::Industrial,
        LandUse::Institutional,
        LandUse::MixedUse,
        LandUse::Agricultural,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LandUse::Residential => "residential",
            LandUse::Commercial => "commercial",
            LandUse::Industrial => "industrial",
            LandUse::Institutional => "institutional",
            LandUse::MixedUse => "mixed_use",
            LandUse::Agricultural => "agricultural",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LandUse::Residential => "Residential",
            LandUse::Commercial => "Commercial",
            LandUse::Industrial => "Industrial",
            LandUse::Institutional => "Institutional",
            LandUse::MixedUse => "Mixed use",
            LandUse::Agricultural => "Agricultural",
        }
    }
}

impl fmt::Display for LandUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LandUse {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        LandUse::ALL
            .into_iter()
            .find(|land_use| land_use.as_str() == normalized)
            .ok_or_else(|| format!("unknown land use `{}`", s.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SarApplicant {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub firm_name: Option<String>,
    pub membership_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteDetails {
    pub address: String,
    pub plot_number: String,
    pub land_area_sqm: f64,
    pub land_use: LandUse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteReport {
    pub purpose: String,
    pub site_description: String,
    pub accessibility: Option<String>,
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SarDocuments {
    pub survey_plan: FileHandle,
    pub title_document: FileHandle,
    pub site_photographs: FileHandle,
    pub environmental_clearance: Option<FileHandle>,
    pub location_map: Option<FileHandle>,
}

/// Typed output of a completed Site Analysis Report application.
#[derive(Debug, Clone, PartialEq)]
pub struct SarData {
    pub applicant: SarApplicant,
    pub site: SiteDetails,
    pub report: SiteReport,
    pub documents: SarDocuments,
    pub signatory_name: String,
    pub declaration_accepted: bool,
}

impl IntakeForm for SarData {
    fn kind(&self) -> ApplicationKind {
        ApplicationKind::Sar
    }

    fn applicant_name(&self) -> &str {
        &self.applicant.name
    }

    fn email(&self) -> &str {
        &self.applicant.email
    }
}

pub struct SarWizard {
    descriptor: WizardDescriptor,
}

impl Default for SarWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl SarWizard {
    pub fn new() -> Self {
        let land_use_options = LandUse::ALL
            .iter()
            .map(|land_use| ChoiceOption::new(land_use.as_str(), land_use.label()))
            .collect();

        let steps = vec![
            StepDescriptor::new(
                "applicant",
                "Applicant details",
                vec![
                    FieldDescriptor::new("applicantName", "Applicant name", FieldKind::Text),
                    FieldDescriptor::new("email", "Email address", FieldKind::Email)
                        .with_validator(Validator::Email),
                    FieldDescriptor::new("phone", "Phone number", FieldKind::Phone)
                        .with_validator(Validator::Phone),
                    FieldDescriptor::new("firmName", "Planning firm", FieldKind::Text)
                        .with_optional(),
                    FieldDescriptor::new("membershipId", "NITP membership ID", FieldKind::Text)
                        .with_validator(Validator::MembershipId)
                        .with_optional()
                        .with_help("Registered planners enter the ID printed on their certificate."),
                ],
            ),
            StepDescriptor::new(
                "site",
                "Site details",
                vec![
                    FieldDescriptor::new("siteAddress", "Site address", FieldKind::Text),
                    FieldDescriptor::new("plotNumber", "Plot number", FieldKind::Text),
                    FieldDescriptor::new("landArea", "Land area (sqm)", FieldKind::Number)
                        .with_validator(Validator::PositiveNumber),
                    FieldDescriptor::new(
                        "landUse",
                        "Proposed land use",
                        FieldKind::Choice(land_use_options),
                    ),
                ],
            ),
            StepDescriptor::new(
                "report",
                "Report content",
                vec![
                    FieldDescriptor::new("purpose", "Purpose of the report", FieldKind::Text),
                    FieldDescriptor::new("siteDescription", "Site description", FieldKind::Text),
                    FieldDescriptor::new("accessibility", "Access and circulation", FieldKind::Text)
                        .with_optional(),
                    FieldDescriptor::new("recommendation", "Recommendation", FieldKind::Text)
                        .with_optional(),
                ],
            ),
            StepDescriptor::new(
                "documents",
                "Supporting documents",
                vec![
                    FieldDescriptor::new("surveyPlan", "Survey plan", FieldKind::File),
                    FieldDescriptor::new("titleDocument", "Title document", FieldKind::File),
                    FieldDescriptor::new("sitePhotographs", "Site photographs", FieldKind::File),
                    FieldDescriptor::new(
                        "environmentalClearance",
                        "Environmental clearance",
                        FieldKind::File,
                    )
                    .required_when(industrial_site),
                    FieldDescriptor::new("locationMap", "Location map", FieldKind::File)
                        .with_optional(),
                ],
            ),
            StepDescriptor::new(
                "declaration",
                "Declaration",
                vec![
                    FieldDescriptor::new("signatoryName", "Signatory name", FieldKind::Text),
                    FieldDescriptor::declaration("declarationAccepted", "Declaration"),
                ],
            ),
        ];

        Self {
            descriptor: WizardDescriptor::new("sar", steps),
        }
    }
}

impl WizardFlow for SarWizard {
    type Output = SarData;

    fn descriptor(&self) -> &WizardDescriptor {
        &self.descriptor
    }

    fn commit(&self, record: &ApplicationRecord) -> Result<SarData> {
        Ok(SarData {
            applicant: SarApplicant {
                name: required_text(record, "applicantName")?,
                email: required_text(record, "email")?,
                phone: required_text(record, "phone")?,
                firm_name: optional_text(record, "firmName"),
                membership_id: optional_text(record, "membershipId"),
            },
            site: SiteDetails {
                address: required_text(record, "siteAddress")?,
                plot_number: required_text(record, "plotNumber")?,
                land_area_sqm: parsed(record, "landArea")?,
                land_use: parsed(record, "landUse")?,
            },
            report: SiteReport {
                purpose: required_text(record, "purpose")?,
                site_description: required_text(record, "siteDescription")?,
                accessibility: optional_text(record, "accessibility"),
                recommendation: optional_text(record, "recommendation"),
            },
            documents: SarDocuments {
                survey_plan: required_file(record, "surveyPlan")?,
                title_document: required_file(record, "titleDocument")?,
                site_photographs: required_file(record, "sitePhotographs")?,
                environmental_clearance: optional_file(record, "environmentalClearance"),
                location_map: optional_file(record, "locationMap"),
            },
            signatory_name: required_text(record, "signatoryName")?,
            declaration_accepted: record.flag("declarationAccepted"),
        })
    }
}

fn industrial_site(record: &ApplicationRecord) -> bool {
    record
        .text("landUse")
        .and_then(|value| value.parse::<LandUse>().ok())
        == Some(LandUse::Industrial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::{StepOutcome, WizardController};

    #[test]
    fn industrial_sites_need_environmental_clearance() {
        let wizard = SarWizard::new();
        let documents = wizard.descriptor().step_index("documents").unwrap();
        let step = wizard.descriptor().step(documents).unwrap();

        let mut record = ApplicationRecord::new();
        record.set("landUse", "residential");
        assert!(!step.required_fields(&record).contains("environmentalClearance"));
        record.set("landUse", "industrial");
        assert!(step.required_fields(&record).contains("environmentalClearance"));
    }

    #[test]
    fn membership_id_is_format_checked_when_given() {
        let wizard = SarWizard::new();
        let mut controller = WizardController::new(&wizard);
        controller.update_field("applicantName", "Halima Yusuf");
        controller.update_field("email", "halima@example.com");
        controller.update_field("phone", "08031234567");
        controller.update_field("membershipId", "TPA36212");
        assert_eq!(controller.go_next(), StepOutcome::Blocked);
        assert!(controller.errors().contains("membershipId"));

        controller.update_field("membershipId", "TPA3620045012");
        assert_eq!(controller.go_next(), StepOutcome::Advanced);
    }

    #[test]
    fn land_area_must_be_positive() {
        let wizard = SarWizard::new();
        let mut controller = WizardController::new(&wizard);
        controller.update_field("applicantName", "Halima Yusuf");
        controller.update_field("email", "halima@example.com");
        controller.update_field("phone", "08031234567");
        controller.go_next();
        controller.update_field("siteAddress", "Plot 12, Jabi");
        controller.update_field("plotNumber", "12");
        controller.update_field("landArea", "0");
        controller.update_field("landUse", "commercial");
        assert_eq!(controller.go_next(), StepOutcome::Blocked);
        assert_eq!(
            controller.errors().get("landArea"),
            Some("Value must be greater than zero")
        );
    }

    #[test]
    fn land_use_must_be_a_listed_value() {
        let wizard = SarWizard::new();
        let mut controller = WizardController::new(&wizard);
        controller.update_field("applicantName", "Halima Yusuf");
        controller.update_field("email", "halima@example.com");
        controller.update_field("phone", "08031234567");
        assert_eq!(controller.go_next(), StepOutcome::Advanced);
        controller.update_field("siteAddress", "Plot 12, Jabi");
        controller.update_field("plotNumber", "12");
        controller.update_field("landArea", "850");

        for rejected in ["bogus", "Industrial"] {
            controller.update_field("landUse", rejected);
            assert_eq!(controller.go_next(), StepOutcome::Blocked);
            assert!(controller
                .errors()
                .get("landUse")
                .is_some_and(|message| message.starts_with("Value must be one of:")));
        }

        controller.update_field("landUse", "industrial");
        assert_eq!(controller.go_next(), StepOutcome::Advanced);
    }
}
