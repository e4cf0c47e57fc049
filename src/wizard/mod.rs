//! Wizard-style form framework used by every application flow.
//!
//! A [`WizardDescriptor`] lists ordered steps and their fields, a
//! [`WizardController`] gates forward navigation on per-step validation, and
//! a [`WizardEngine`] drives the controller through an interactive surface.

pub mod controller;
pub mod descriptor;
pub mod engine;
pub mod flow;
pub mod validation;

pub use controller::{StepOutcome, SubmitOutcome, WizardController, WizardState};
pub use descriptor::{
    ChoiceOption, FieldDescriptor, FieldKind, Requirement, StepDescriptor, WizardDescriptor,
};
pub use engine::{
    build_summary, ConfirmationResponse, PromptContext, PromptResponse, WizardEngine,
    WizardInteraction, WizardResult, WizardSummary,
};
pub use flow::{Submission, SubmissionSink, WizardFlow};
pub use validation::{ValidationError, ValidationErrorSet, Validator};
