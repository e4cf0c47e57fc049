use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::domain::{ApplicationKind, ApplicationRecord, FileHandle};
use crate::errors::{PortalError, Result};
use crate::wizard::{
    ChoiceOption, FieldDescriptor, FieldKind, StepDescriptor, Validator, WizardDescriptor,
    WizardFlow,
};

use super::intake::IntakeForm;
use super::{optional_file, optional_text, parsed, required_file, required_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectType {
    Infrastructure,
    Industrial,
    ResidentialEstate,
    Commercial,
    Mining,
    Energy,
}

impl ProjectType {
    pub const ALL: [ProjectType; 6] = [
        ProjectType::Infrastructure,
        ProjectType::Industrial,
        ProjectType::ResidentialEstate,
        ProjectType::Commercial,
        ProjectType::Mining,
        ProjectType::Energy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Infrastructure => "infrastructure",
            ProjectType::Industrial => "industrial",
            ProjectType::ResidentialEstate => "residential_estate",
            ProjectType::Commercial => "commercial",
            ProjectType::Mining => "mining",
            ProjectType::Energy => "energy",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProjectType::Infrastructure => "Infrastructure",
            ProjectType::Industrial => "Industrial facility",
            ProjectType::ResidentialEstate => "Residential estate",
            ProjectType::Commercial => "Commercial development",
            ProjectType::Mining => "Mining and quarrying",
            ProjectType::Energy => "Energy and power",
        }
    }

    /// Project types that must attach a hazard assessment.
    pub fn is_hazardous(&self) -> bool {
        matches!(
            self,
            ProjectType::Industrial | ProjectType::Mining | ProjectType::Energy
        )
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ProjectType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| format!("unknown project type `{}`", s.trim()))
    }
}

fn consultation_held(record: &ApplicationRecord) -> bool {
    record.flag("consultationHeld")
}

fn hazardous_project(record: &ApplicationRecord) -> bool {
    record
        .text("projectType")
        .and_then(|value| value.parse::<ProjectType>().ok())
        .map(|kind| kind.is_hazardous())
        .unwrap_or(false)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectInfo {
    pub title: String,
    pub project_type: ProjectType,
    pub location: String,
    pub estimated_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proponent {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescription {
    pub description: String,
    pub scope: String,
    pub start_date: NaiveDate,
    pub duration_months: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineConditions {
    pub ecological: String,
    pub socio_economic: String,
    pub air_quality: Option<String>,
    pub water_resources: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpactAssessment {
    pub summary: String,
    pub mitigation: String,
    pub monitoring_plan: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consultation {
    pub held: bool,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EiarDocuments {
    pub project_layout: FileHandle,
    pub site_map: FileHandle,
    pub consultant_certificate: FileHandle,
    pub hazard_assessment: Option<FileHandle>,
    pub consultation_minutes: Option<FileHandle>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsultantDeclaration {
    pub consultant_name: String,
    pub consultant_license: String,
    pub accepted: bool,
}

/// Typed output of a completed Environmental Impact Assessment Report.
#[derive(Debug, Clone, PartialEq)]
pub struct EiarData {
    pub project: ProjectInfo,
    pub proponent: Proponent,
    pub description: ProjectDescription,
    pub baseline: BaselineConditions,
    pub impacts: ImpactAssessment,
    pub consultation: Consultation,
    pub documents: EiarDocuments,
    pub declaration: ConsultantDeclaration,
}

impl IntakeForm for EiarData {
    fn kind(&self) -> ApplicationKind {
        ApplicationKind::Eiar
    }

    fn applicant_name(&self) -> &str {
        &self.proponent.name
    }

    fn email(&self) -> &str {
        &self.proponent.email
    }
}

/// Eight-section EIAR submission.
pub struct EiarWizard {
    descriptor: WizardDescriptor,
}

impl Default for EiarWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl EiarWizard {
    pub fn new() -> Self {
        let project_types = ProjectType::ALL
            .iter()
            .map(|kind| ChoiceOption::new(kind.as_str(), kind.label()))
            .collect();

        let steps = vec![
            StepDescriptor::new(
                "project",
                "Project information",
                vec![
                    FieldDescriptor::new("projectTitle", "Project title", FieldKind::Text),
                    FieldDescriptor::new(
                        "projectType",
                        "Project type",
                        FieldKind::Choice(project_types),
                    ),
                    FieldDescriptor::new("projectLocation", "Project location", FieldKind::Text),
                    FieldDescriptor::new(
                        "estimatedCost",
                        "Estimated cost (NGN)",
                        FieldKind::Number,
                    )
                    .with_validator(Validator::PositiveNumber),
                ],
            ),
            StepDescriptor::new(
                "proponent",
                "Project proponent",
                vec![
                    FieldDescriptor::new("proponentName", "Proponent name", FieldKind::Text),
                    FieldDescriptor::new("proponentEmail", "Proponent email", FieldKind::Email)
                        .with_validator(Validator::Email),
                    FieldDescriptor::new("proponentPhone", "Proponent phone", FieldKind::Phone)
                        .with_validator(Validator::Phone),
                    FieldDescriptor::new(
                        "proponentAddress",
                        "Proponent address",
                        FieldKind::Text,
                    ),
                ],
            ),
            StepDescriptor::new(
                "description",
                "Project description",
                vec![
                    FieldDescriptor::new(
                        "projectDescription",
                        "Project description",
                        FieldKind::Text,
                    ),
                    FieldDescriptor::new("projectScope", "Scope of works", FieldKind::Text),
                    FieldDescriptor::new("startDate", "Planned start date", FieldKind::Date)
                        .with_validator(Validator::Date),
                    FieldDescriptor::new(
                        "durationMonths",
                        "Duration (months)",
                        FieldKind::Number,
                    )
                    .with_validator(Validator::PositiveInteger),
                ],
            ),
            StepDescriptor::new(
                "baseline",
                "Baseline environment",
                vec![
                    FieldDescriptor::new(
                        "ecologicalBaseline",
                        "Ecological baseline",
                        FieldKind::Text,
                    ),
                    FieldDescriptor::new(
                        "socioEconomicBaseline",
                        "Socio-economic baseline",
                        FieldKind::Text,
                    ),
                    FieldDescriptor::new("airQuality", "Air quality", FieldKind::Text)
                        .with_optional(),
                    FieldDescriptor::new("waterResources", "Water resources", FieldKind::Text)
                        .with_optional(),
                ],
            ),
            StepDescriptor::new(
                "impacts",
                "Impacts and mitigation",
                vec![
                    FieldDescriptor::new("impactSummary", "Impact summary", FieldKind::Text),
                    FieldDescriptor::new(
                        "mitigationMeasures",
                        "Mitigation measures",
                        FieldKind::Text,
                    ),
                    FieldDescriptor::new("monitoringPlan", "Monitoring plan", FieldKind::Text),
                ],
            ),
            StepDescriptor::new(
                "consultation",
                "Public consultation",
                vec![
                    FieldDescriptor::new(
                        "consultationHeld",
                        "Consultation held",
                        FieldKind::Boolean,
                    ),
                    FieldDescriptor::new(
                        "consultationSummary",
                        "Consultation summary",
                        FieldKind::Text,
                    )
                    .required_when(consultation_held),
                ],
            ),
            StepDescriptor::new(
                "documents",
                "Supporting documents",
                vec![
                    FieldDescriptor::new("projectLayout", "Project layout", FieldKind::File),
                    FieldDescriptor::new("siteMap", "Site map", FieldKind::File),
                    FieldDescriptor::new(
                        "consultantCertificate",
                        "Consultant certificate",
                        FieldKind::File,
                    ),
                    FieldDescriptor::new("hazardAssessment", "Hazard assessment", FieldKind::File)
                        .required_when(hazardous_project),
                    FieldDescriptor::new(
                        "consultationMinutes",
                        "Consultation minutes",
                        FieldKind::File,
                    )
                    .required_when(consultation_held),
                ],
            ),
            StepDescriptor::new(
                "declaration",
                "Consultant declaration",
                vec![
                    FieldDescriptor::new("consultantName", "Consultant name", FieldKind::Text),
                    FieldDescriptor::new(
                        "consultantLicense",
                        "Consultant licence number",
                        FieldKind::Text,
                    ),
                    FieldDescriptor::declaration("declarationAccepted", "Declaration"),
                ],
            ),
        ];

        Self {
            descriptor: WizardDescriptor::new("eiar", steps),
        }
    }
}

impl WizardFlow for EiarWizard {
    type Output = EiarData;

    fn descriptor(&self) -> &WizardDescriptor {
        &self.descriptor
    }

    fn commit(&self, record: &ApplicationRecord) -> Result<EiarData> {
        let start_date = NaiveDate::parse_from_str(&required_text(record, "startDate")?, "%Y-%m-%d")
            .map_err(|err| PortalError::InvalidInput(format!("`startDate`: {}", err)))?;
        let held = consultation_held(record);

        Ok(EiarData {
            project: ProjectInfo {
                title: required_text(record, "projectTitle")?,
                project_type: parsed(record, "projectType")?,
                location: required_text(record, "projectLocation")?,
                estimated_cost: parsed(record, "estimatedCost")?,
            },
            proponent: Proponent {
                name: required_text(record, "proponentName")?,
                email: required_text(record, "proponentEmail")?,
                phone: required_text(record, "proponentPhone")?,
                address: required_text(record, "proponentAddress")?,
            },
            description: ProjectDescription {
                description: required_text(record, "projectDescription")?,
                scope: required_text(record, "projectScope")?,
                start_date,
                duration_months: parsed(record, "durationMonths")?,
            },
            baseline: BaselineConditions {
                ecological: required_text(record, "ecologicalBaseline")?,
                socio_economic: required_text(record, "socioEconomicBaseline")?,
                air_quality: optional_text(record, "airQuality"),
                water_resources: optional_text(record, "waterResources"),
            },
            impacts: ImpactAssessment {
                summary: required_text(record, "impactSummary")?,
                mitigation: required_text(record, "mitigationMeasures")?,
                monitoring_plan: required_text(record, "monitoringPlan")?,
            },
            consultation: Consultation {
                held,
                summary: optional_text(record, "consultationSummary").filter(|_| held),
            },
            documents: EiarDocuments {
                project_layout: required_file(record, "projectLayout")?,
                site_map: required_file(record, "siteMap")?,
                consultant_certificate: required_file(record, "consultantCertificate")?,
                hazard_assessment: optional_file(record, "hazardAssessment"),
                consultation_minutes: optional_file(record, "consultationMinutes"),
            },
            declaration: ConsultantDeclaration {
                consultant_name: required_text(record, "consultantName")?,
                consultant_license: required_text(record, "consultantLicense")?,
                accepted: record.flag("declarationAccepted"),
            },
        })
    }
}
