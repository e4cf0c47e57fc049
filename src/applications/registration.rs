use crate::config::DEFAULT_PASSWORD_MIN_LENGTH;
use crate::domain::{
    ApplicationKind, ApplicationRecord, ApplicationStatus, FileHandle, MembershipType,
};
use crate::errors::Result;
use crate::wizard::{
    ChoiceOption, FieldDescriptor, FieldKind, StepDescriptor, Validator, WizardDescriptor,
    WizardFlow,
};

use super::intake::IntakeForm;
use super::{optional_file, optional_text, parsed, required_file, required_text};

/// Documents every applicant uploads regardless of grade.
pub const UNIVERSAL_DOCUMENTS: [&str; 3] =
    ["passportPhoto", "birthCertificate", "academicCertificate"];

/// Extra documents mandated by a membership grade.
pub fn conditional_documents(membership_type: MembershipType) -> &'static [&'static str] {
    match membership_type {
        MembershipType::Student => &[],
        MembershipType::Graduate => &["nyscCertificate"],
        MembershipType::Probationer => &["nyscCertificate", "trainingLogbook"],
        MembershipType::Corporate => &["toprecCertificate", "professionalExamResult"],
        MembershipType::Fellow => &["toprecCertificate", "fellowshipCitation"],
    }
}

/// Full required-document list for a grade.
pub fn required_documents(membership_type: MembershipType) -> Vec<&'static str> {
    let mut documents = UNIVERSAL_DOCUMENTS.to_vec();
    documents.extend_from_slice(conditional_documents(membership_type));
    documents
}

fn selected_membership(record: &ApplicationRecord) -> Option<MembershipType> {
    record
        .text("membershipType")
        .and_then(|value| value.parse().ok())
}

fn conditional_document(key: &'static str, label: &'static str) -> FieldDescriptor {
    FieldDescriptor::new(key, label, FieldKind::File).required_when(move |record| {
        selected_membership(record)
            .map(|membership| conditional_documents(membership).contains(&key))
            .unwrap_or(false)
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDetails {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToprecDetails {
    pub registration_number: Option<String>,
    pub registration_year: Option<u16>,
    pub institution: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationDocuments {
    pub passport_photo: FileHandle,
    pub birth_certificate: FileHandle,
    pub academic_certificate: FileHandle,
    pub nysc_certificate: Option<FileHandle>,
    pub training_logbook: Option<FileHandle>,
    pub toprec_certificate: Option<FileHandle>,
    pub professional_exam_result: Option<FileHandle>,
    pub fellowship_citation: Option<FileHandle>,
    pub curriculum_vitae: Option<FileHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationDeclarations {
    pub accuracy: bool,
    pub code_of_conduct: bool,
    pub data_consent: bool,
    pub dues_commitment: bool,
}

/// Typed output of a completed registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationData {
    pub membership_type: MembershipType,
    pub account: AccountDetails,
    pub toprec: ToprecDetails,
    pub documents: RegistrationDocuments,
    pub declarations: RegistrationDeclarations,
}

impl IntakeForm for RegistrationData {
    fn kind(&self) -> ApplicationKind {
        ApplicationKind::Membership
    }

    fn applicant_name(&self) -> &str {
        &self.account.full_name
    }

    fn email(&self) -> &str {
        &self.account.email
    }

    fn membership_type(&self) -> Option<MembershipType> {
        Some(self.membership_type)
    }

    fn initial_status(&self) -> ApplicationStatus {
        ApplicationStatus::PendingEmail
    }
}

/// Five-step membership registration.
pub struct RegistrationWizard {
    descriptor: WizardDescriptor,
}

impl Default for RegistrationWizard {
    fn default() -> Self {
        Self::new(DEFAULT_PASSWORD_MIN_LENGTH)
    }
}

impl RegistrationWizard {
    pub fn new(password_min_length: usize) -> Self {
        let membership_options = MembershipType::ALL
            .iter()
            .map(|kind| ChoiceOption::new(kind.as_str(), kind.label()))
            .collect();

        let steps = vec![
            StepDescriptor::new(
                "membership",
                "Membership type",
                vec![FieldDescriptor::new(
                    "membershipType",
                    "Membership type",
                    FieldKind::Choice(membership_options),
                )
                .with_help("Your grade decides which supporting documents are mandatory.")],
            ),
            StepDescriptor::new(
                "account",
                "Account information",
                vec![
                    FieldDescriptor::new("fullName", "Full name", FieldKind::Text),
                    FieldDescriptor::new("email", "Email address", FieldKind::Email)
                        .with_validator(Validator::Email)
                        .with_help("A confirmation link is sent to this address."),
                    FieldDescriptor::new("phone", "Phone number", FieldKind::Phone)
                        .with_validator(Validator::Phone)
                        .with_optional(),
                    FieldDescriptor::new("password", "Password", FieldKind::Password)
                        .with_validator(Validator::MinLength(password_min_length)),
                    FieldDescriptor::new("confirmPassword", "Confirm password", FieldKind::Password)
                        .with_validator(Validator::Matches {
                            field: "password",
                            label: "Password",
                        }),
                ],
            ),
            StepDescriptor::new(
                "toprec",
                "TOPREC details",
                vec![
                    FieldDescriptor::new(
                        "toprecNumber",
                        "TOPREC registration number",
                        FieldKind::Text,
                    )
                    .with_optional()
                    .with_help("Leave blank if you are not yet registered with TOPREC."),
                    FieldDescriptor::new("toprecYear", "Year of registration", FieldKind::Number)
                        .with_validator(Validator::Year)
                        .with_optional(),
                    FieldDescriptor::new("institution", "Institution attended", FieldKind::Text)
                        .with_optional(),
                ],
            ),
            StepDescriptor::new(
                "documents",
                "Supporting documents",
                vec![
                    FieldDescriptor::new("passportPhoto", "Passport photograph", FieldKind::File),
                    FieldDescriptor::new("birthCertificate", "Birth certificate", FieldKind::File),
                    FieldDescriptor::new(
                        "academicCertificate",
                        "Academic certificate",
                        FieldKind::File,
                    ),
                    conditional_document("nyscCertificate", "NYSC certificate"),
                    conditional_document("trainingLogbook", "Training logbook"),
                    conditional_document("toprecCertificate", "TOPREC certificate"),
                    conditional_document("professionalExamResult", "Professional exam result"),
                    conditional_document("fellowshipCitation", "Fellowship citation"),
                    FieldDescriptor::new("curriculumVitae", "Curriculum vitae", FieldKind::File)
                        .with_optional(),
                ],
            ),
            StepDescriptor::new(
                "declarations",
                "Declarations",
                vec![
                    FieldDescriptor::declaration(
                        "declareAccuracy",
                        "Information accuracy declaration",
                    ),
                    FieldDescriptor::declaration(
                        "declareCodeOfConduct",
                        "Code of conduct declaration",
                    ),
                    FieldDescriptor::declaration("declareDataConsent", "Data processing consent"),
                    FieldDescriptor::declaration(
                        "declareDuesCommitment",
                        "Annual dues commitment",
                    ),
                ],
            ),
        ];

        Self {
            descriptor: WizardDescriptor::new("registration", steps),
        }
    }
}

impl WizardFlow for RegistrationWizard {
    type Output = RegistrationData;

    fn descriptor(&self) -> &WizardDescriptor {
        &self.descriptor
    }

    fn commit(&self, record: &ApplicationRecord) -> Result<RegistrationData> {
        let registration_year = match record.text("toprecYear") {
            Some(_) => Some(parsed::<u16>(record, "toprecYear")?),
            None => None,
        };

        Ok(RegistrationData {
            membership_type: parsed(record, "membershipType")?,
            account: AccountDetails {
                full_name: required_text(record, "fullName")?,
                email: required_text(record, "email")?,
                phone: optional_text(record, "phone"),
            },
            toprec: ToprecDetails {
                registration_number: optional_text(record, "toprecNumber"),
                registration_year,
                institution: optional_text(record, "institution"),
            },
            documents: RegistrationDocuments {
                passport_photo: required_file(record, "passportPhoto")?,
                birth_certificate: required_file(record, "birthCertificate")?,
                academic_certificate: required_file(record, "academicCertificate")?,
                nysc_certificate: optional_file(record, "nyscCertificate"),
                training_logbook: optional_file(record, "trainingLogbook"),
                toprec_certificate: optional_file(record, "toprecCertificate"),
                professional_exam_result: optional_file(record, "professionalExamResult"),
                fellowship_citation: optional_file(record, "fellowshipCitation"),
                curriculum_vitae: optional_file(record, "curriculumVitae"),
            },
            declarations: RegistrationDeclarations {
                accuracy: record.flag("declareAccuracy"),
                code_of_conduct: record.flag("declareCodeOfConduct"),
                data_consent: record.flag("declareDataConsent"),
                dues_commitment: record.flag("declareDuesCommitment"),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::{StepOutcome, WizardController};

    fn advance_to_documents(
        controller: &mut WizardController<'_, RegistrationWizard>,
        membership: &str,
    ) {
        controller.update_field("membershipType", membership);
        assert_eq!(controller.go_next(), StepOutcome::Advanced);
        controller.update_field("fullName", "Chidi Okafor");
        controller.update_field("email", "chidi@example.com");
        controller.update_field("password", "planning2026");
        controller.update_field("confirmPassword", "planning2026");
        assert_eq!(controller.go_next(), StepOutcome::Advanced);
        assert_eq!(controller.go_next(), StepOutcome::Advanced);
        assert_eq!(controller.current_step().unwrap().id, "documents");
    }

    #[test]
    fn required_documents_follow_membership_type() {
        assert_eq!(required_documents(MembershipType::Student).len(), 3);
        assert!(required_documents(MembershipType::Probationer).contains(&"trainingLogbook"));
        assert!(required_documents(MembershipType::Fellow).contains(&"fellowshipCitation"));
    }

    #[test]
    fn changing_membership_type_changes_required_documents() {
        let wizard = RegistrationWizard::default();
        let mut controller = WizardController::new(&wizard);
        advance_to_documents(&mut controller, "corporate");

        let required = controller.required_fields();
        assert!(required.contains("toprecCertificate"));
        assert!(required.contains("professionalExamResult"));

        controller.go_previous();
        controller.go_previous();
        controller.go_previous();
        controller.update_field("membershipType", "graduate");
        assert_eq!(controller.go_next(), StepOutcome::Advanced);
        assert_eq!(controller.go_next(), StepOutcome::Advanced);
        assert_eq!(controller.go_next(), StepOutcome::Advanced);

        let required = controller.required_fields();
        assert!(required.contains("nyscCertificate"));
        assert!(!required.contains("toprecCertificate"));
        assert!(!required.contains("professionalExamResult"));
    }

    #[test]
    fn documents_step_blocks_on_grade_specific_upload() {
        let wizard = RegistrationWizard::default();
        let mut controller = WizardController::new(&wizard);
        advance_to_documents(&mut controller, "graduate");
        for key in UNIVERSAL_DOCUMENTS {
            controller.update_field(key, FileHandle::new(format!("{key}.pdf"), 1024));
        }
        assert_eq!(controller.go_next(), StepOutcome::Blocked);
        let failing: Vec<&str> = controller.errors().fields().collect();
        assert_eq!(failing, vec!["nyscCertificate"]);
        assert_eq!(
            controller.errors().get("nyscCertificate"),
            Some("NYSC certificate must be uploaded")
        );
    }

    #[test]
    fn password_confirmation_must_match() {
        let wizard = RegistrationWizard::default();
        let mut controller = WizardController::new(&wizard);
        controller.update_field("membershipType", "student");
        controller.go_next();
        controller.update_field("fullName", "Chidi Okafor");
        controller.update_field("email", "chidi@example.com");
        controller.update_field("password", "planning2026");
        controller.update_field("confirmPassword", "planning2025");
        assert_eq!(controller.go_next(), StepOutcome::Blocked);
        assert_eq!(
            controller.errors().get("confirmPassword"),
            Some("Must match Password")
        );
    }

    #[test]
    fn short_password_uses_configured_minimum() {
        let wizard = RegistrationWizard::new(12);
        let mut controller = WizardController::new(&wizard);
        controller.update_field("membershipType", "student");
        controller.go_next();
        controller.update_field("fullName", "Chidi Okafor");
        controller.update_field("email", "chidi@example.com");
        controller.update_field("password", "planning2026");
        controller.update_field("confirmPassword", "planning2026");
        assert_eq!(controller.go_next(), StepOutcome::Blocked);
        assert!(controller
            .errors()
            .get("password")
            .unwrap()
            .contains("at least 12"));
    }
}
