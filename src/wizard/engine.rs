use crate::domain::{ApplicationRecord, FieldValue};
use crate::errors::Result;

use super::controller::{StepOutcome, SubmitOutcome, WizardController};
use super::descriptor::{FieldDescriptor, FieldKind, StepDescriptor, WizardDescriptor};
use super::flow::{SubmissionSink, WizardFlow};
use super::validation::{ValidationError, ValidationErrorSet};

/// High-level lifecycle states emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardResult<T> {
    Completed(T),
    Cancelled,
}

/// Describes how prompts can be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    /// User supplied a concrete value.
    Value(String),
    /// Keep the current value (or leave the field blank).
    Keep,
    /// Abandon the wizard; the record is discarded.
    Cancel,
    /// Go back to the previous field, or the previous step from the first field.
    Back,
    /// Request additional information for the current field.
    Help,
}

/// Responses accepted when confirming the collected data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationResponse {
    Confirm,
    Back,
    Cancel,
}

/// Data provided to render the current field.
pub struct PromptContext<'a> {
    pub field: &'a FieldDescriptor,
    pub current: Option<&'a FieldValue>,
    pub required: bool,
    pub error: Option<&'a str>,
    pub step_index: usize,
    pub total_steps: usize,
    pub first_field: bool,
}

impl PromptContext<'_> {
    /// Current value rendered for display; passwords are masked.
    pub fn current_display(&self) -> Option<String> {
        self.current
            .filter(|value| value.is_present())
            .map(|value| display_value(self.field, value))
    }
}

/// Snapshot of collected data displayed before final confirmation.
#[derive(Debug, Default)]
pub struct WizardSummary {
    pub sections: Vec<(String, Vec<(String, String)>)>,
}

impl WizardSummary {
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec!["Review your entries:".to_string()];
        for (title, entries) in &self.sections {
            lines.push(format!("{}:", title));
            for (label, value) in entries {
                lines.push(format!("  {}: {}", label, value));
            }
        }
        lines
    }
}

/// Interaction surface used by the engine. The shell provides a dialoguer
/// implementation and a line-based one for scripted sessions.
pub trait WizardInteraction {
    fn begin_step(&mut self, _step: &StepDescriptor, _index: usize, _total: usize) {}

    fn prompt_field(&mut self, context: &PromptContext<'_>) -> PromptResponse;

    fn show_help(&mut self, _field: &FieldDescriptor) {}

    fn report_input_error(&mut self, field: &FieldDescriptor, error: &ValidationError);

    fn report_errors(&mut self, step: &StepDescriptor, errors: &ValidationErrorSet);

    fn confirm(&mut self, summary: &WizardSummary) -> ConfirmationResponse;
}

/// Drives a [`WizardFlow`] using a [`WizardInteraction`] implementation.
pub struct WizardEngine<'a, F: WizardFlow> {
    flow: &'a F,
}

impl<'a, F: WizardFlow> WizardEngine<'a, F> {
    pub fn new(flow: &'a F) -> Self {
        Self { flow }
    }

    pub fn run<I, S>(&self, interaction: &mut I, sink: &mut S) -> Result<WizardResult<S::Receipt>>
    where
        I: WizardInteraction,
        S: SubmissionSink<F::Output>,
    {
        let mut controller = WizardController::new(self.flow);
        let mut pending = controller.current_step().map(all_fields).unwrap_or_default();
        let mut cursor = 0usize;
        let mut announced: Option<usize> = None;

        loop {
            let step_index = controller.current_step_index();
            let total = controller.total_steps();

            if let Some(step) = controller.current_step() {
                if announced != Some(step_index) {
                    interaction.begin_step(step, step_index, total);
                    announced = Some(step_index);
                }

                if let Some(&field_index) = pending.get(cursor) {
                    let field = &step.fields[field_index];
                    let response = {
                        let context = PromptContext {
                            field,
                            current: controller.record().get(field.key),
                            required: field.is_required(controller.record()),
                            error: controller.errors().get(field.key),
                            step_index,
                            total_steps: total,
                            first_field: step_index == 0 && cursor == 0,
                        };
                        interaction.prompt_field(&context)
                    };

                    match response {
                        PromptResponse::Value(raw) => match field.kind.parse_input(&raw) {
                            Ok(value) => {
                                controller.update_field(field.key, value);
                                cursor += 1;
                            }
                            Err(err) => interaction.report_input_error(field, &err),
                        },
                        PromptResponse::Keep => cursor += 1,
                        PromptResponse::Help => interaction.show_help(field),
                        PromptResponse::Back => {
                            if cursor > 0 {
                                cursor -= 1;
                            } else if controller.go_previous() == StepOutcome::Retreated {
                                pending = controller.current_step().map(all_fields).unwrap_or_default();
                                cursor = pending.len().saturating_sub(1);
                            } else {
                                interaction.report_input_error(
                                    field,
                                    &ValidationError::new("Already at the first field."),
                                );
                            }
                        }
                        PromptResponse::Cancel => {
                            tracing::debug!(wizard = self.flow.descriptor().name, "wizard abandoned");
                            return Ok(WizardResult::Cancelled);
                        }
                    }
                    continue;
                }

                if !controller.is_last_step() {
                    match controller.go_next() {
                        StepOutcome::Advanced => {
                            pending = controller.current_step().map(all_fields).unwrap_or_default();
                            cursor = 0;
                        }
                        _ => {
                            interaction.report_errors(step, controller.errors());
                            pending = fields_with_errors(step, controller.errors());
                            cursor = 0;
                        }
                    }
                    continue;
                }
            }

            let summary = build_summary(self.flow.descriptor(), controller.record());
            match interaction.confirm(&summary) {
                ConfirmationResponse::Confirm => match controller.submit(sink)? {
                    SubmitOutcome::Submitted(receipt) => return Ok(WizardResult::Completed(receipt)),
                    SubmitOutcome::Blocked => {
                        if let Some(step) = controller.current_step() {
                            interaction.report_errors(step, controller.errors());
                            pending = fields_with_errors(step, controller.errors());
                        }
                        cursor = 0;
                    }
                    SubmitOutcome::NotReady | SubmitOutcome::AlreadySubmitted => {
                        return Ok(WizardResult::Cancelled);
                    }
                },
                ConfirmationResponse::Back => {
                    // Respect back by showing the last field again.
                    pending = controller.current_step().map(all_fields).unwrap_or_default();
                    cursor = pending.len().saturating_sub(1);
                }
                ConfirmationResponse::Cancel => return Ok(WizardResult::Cancelled),
            }
        }
    }
}

fn all_fields(step: &StepDescriptor) -> Vec<usize> {
    (0..step.fields.len()).collect()
}

fn fields_with_errors(step: &StepDescriptor, errors: &ValidationErrorSet) -> Vec<usize> {
    let failing: Vec<usize> = step
        .fields
        .iter()
        .enumerate()
        .filter(|(_, field)| errors.contains(field.key))
        .map(|(index, _)| index)
        .collect();
    if failing.is_empty() {
        all_fields(step)
    } else {
        failing
    }
}

fn display_value(field: &FieldDescriptor, value: &FieldValue) -> String {
    match (&field.kind, value) {
        (FieldKind::Password, _) => "********".into(),
        (FieldKind::Choice(options), FieldValue::Text(selected)) => options
            .iter()
            .find(|option| &option.value == selected)
            .map(|option| option.label.clone())
            .unwrap_or_else(|| selected.clone()),
        _ => value.to_string(),
    }
}

pub fn build_summary(descriptor: &WizardDescriptor, record: &ApplicationRecord) -> WizardSummary {
    let mut summary = WizardSummary::default();
    for step in &descriptor.steps {
        let entries = step
            .fields
            .iter()
            .map(|field| {
                let value = record
                    .get(field.key)
                    .filter(|value| value.is_present())
                    .map(|value| display_value(field, value))
                    .unwrap_or_else(|| "[unfilled]".to_string());
                (field.label.to_string(), value)
            })
            .collect();
        summary.sections.push((step.title.to_string(), entries));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::flow::Submission;
    use crate::wizard::validation::Validator;
    use std::collections::VecDeque;
    use std::sync::OnceLock;

    struct MockInteraction {
        prompts: VecDeque<PromptResponse>,
        confirmations: VecDeque<ConfirmationResponse>,
        help_hits: usize,
        error_reports: usize,
        prompted: Vec<&'static str>,
    }

    impl MockInteraction {
        fn new(prompts: Vec<PromptResponse>, confirmations: Vec<ConfirmationResponse>) -> Self {
            Self {
                prompts: prompts.into(),
                confirmations: confirmations.into(),
                help_hits: 0,
                error_reports: 0,
                prompted: Vec::new(),
            }
        }
    }

    impl WizardInteraction for MockInteraction {
        fn prompt_field(&mut self, context: &PromptContext<'_>) -> PromptResponse {
            self.prompted.push(context.field.key);
            self.prompts.pop_front().unwrap_or(PromptResponse::Cancel)
        }

        fn show_help(&mut self, _field: &FieldDescriptor) {
            self.help_hits += 1;
        }

        fn report_input_error(&mut self, _field: &FieldDescriptor, _error: &ValidationError) {
            self.error_reports += 1;
        }

        fn report_errors(&mut self, _step: &StepDescriptor, errors: &ValidationErrorSet) {
            self.error_reports += errors.len();
        }

        fn confirm(&mut self, _summary: &WizardSummary) -> ConfirmationResponse {
            self.confirmations
                .pop_front()
                .unwrap_or(ConfirmationResponse::Confirm)
        }
    }

    struct TestForm;

    impl WizardFlow for TestForm {
        type Output = ApplicationRecord;

        fn descriptor(&self) -> &WizardDescriptor {
            static DESCRIPTOR: OnceLock<WizardDescriptor> = OnceLock::new();
            DESCRIPTOR.get_or_init(|| {
                WizardDescriptor::new(
                    "test",
                    vec![
                        StepDescriptor::new(
                            "basics",
                            "Basics",
                            vec![
                                FieldDescriptor::new("name", "Name", FieldKind::Text),
                                FieldDescriptor::new("area", "Area", FieldKind::Number)
                                    .with_validator(Validator::PositiveNumber)
                                    .with_help("Land area in square metres."),
                            ],
                        ),
                        StepDescriptor::new(
                            "declaration",
                            "Declaration",
                            vec![FieldDescriptor::declaration("agree", "Agreement")],
                        ),
                    ],
                )
            })
        }

        fn commit(&self, record: &ApplicationRecord) -> Result<Self::Output> {
            Ok(record.clone())
        }
    }

    #[derive(Default)]
    struct CollectSink {
        accepted: usize,
    }

    impl SubmissionSink<ApplicationRecord> for CollectSink {
        type Receipt = ApplicationRecord;

        fn accept(&mut self, submission: Submission<ApplicationRecord>) -> Result<ApplicationRecord> {
            self.accepted += 1;
            Ok(submission.data)
        }
    }

    fn value(raw: &str) -> PromptResponse {
        PromptResponse::Value(raw.into())
    }

    #[test]
    fn wizard_completes_successfully() {
        let engine = WizardEngine::new(&TestForm);
        let mut interaction = MockInteraction::new(
            vec![value("Gwarinpa plot"), value("450.5"), value("yes")],
            vec![ConfirmationResponse::Confirm],
        );
        let mut sink = CollectSink::default();

        match engine.run(&mut interaction, &mut sink).unwrap() {
            WizardResult::Completed(record) => {
                assert_eq!(record.text("name"), Some("Gwarinpa plot"));
                assert_eq!(record.text("area"), Some("450.5"));
                assert!(record.flag("agree"));
            }
            other => panic!("Unexpected result: {:?}", other),
        }
        assert_eq!(sink.accepted, 1);
    }

    #[test]
    fn blocked_step_reprompts_only_failing_fields() {
        let engine = WizardEngine::new(&TestForm);
        let mut interaction = MockInteraction::new(
            vec![
                value("Gwarinpa plot"),
                value("-3"),
                value("12"),
                value("yes"),
            ],
            vec![ConfirmationResponse::Confirm],
        );
        let mut sink = CollectSink::default();

        let result = engine.run(&mut interaction, &mut sink).unwrap();
        assert!(matches!(result, WizardResult::Completed(_)));
        assert_eq!(interaction.prompted, vec!["name", "area", "area", "agree"]);
        assert_eq!(interaction.error_reports, 1);
    }

    #[test]
    fn unparseable_input_repeats_the_prompt() {
        let engine = WizardEngine::new(&TestForm);
        let mut interaction = MockInteraction::new(
            vec![value("Plot"), value("3"), value("perhaps"), value("y")],
            vec![ConfirmationResponse::Confirm],
        );
        let mut sink = CollectSink::default();

        let result = engine.run(&mut interaction, &mut sink).unwrap();
        assert!(matches!(result, WizardResult::Completed(_)));
        assert_eq!(interaction.prompted, vec!["name", "area", "agree", "agree"]);
    }

    #[test]
    fn back_from_first_field_returns_to_previous_step() {
        let engine = WizardEngine::new(&TestForm);
        let mut interaction = MockInteraction::new(
            vec![
                value("Plot"),
                value("3"),
                PromptResponse::Back,
                value("7"),
                value("yes"),
            ],
            vec![ConfirmationResponse::Confirm],
        );
        let mut sink = CollectSink::default();

        match engine.run(&mut interaction, &mut sink).unwrap() {
            WizardResult::Completed(record) => assert_eq!(record.text("area"), Some("7")),
            other => panic!("Unexpected result: {:?}", other),
        }
        assert_eq!(interaction.prompted, vec!["name", "area", "agree", "area", "agree"]);
    }

    #[test]
    fn declining_declaration_blocks_submission_until_accepted() {
        let engine = WizardEngine::new(&TestForm);
        let mut interaction = MockInteraction::new(
            vec![value("Plot"), value("3"), value("no"), value("yes")],
            vec![ConfirmationResponse::Confirm, ConfirmationResponse::Confirm],
        );
        let mut sink = CollectSink::default();

        let result = engine.run(&mut interaction, &mut sink).unwrap();
        assert!(matches!(result, WizardResult::Completed(_)));
        assert_eq!(sink.accepted, 1);
        assert_eq!(interaction.error_reports, 1);
    }

    #[test]
    fn help_does_not_progress() {
        let engine = WizardEngine::new(&TestForm);
        let mut interaction = MockInteraction::new(
            vec![
                value("Plot"),
                PromptResponse::Help,
                value("3"),
                value("yes"),
            ],
            vec![ConfirmationResponse::Confirm],
        );
        let mut sink = CollectSink::default();

        let result = engine.run(&mut interaction, &mut sink).unwrap();
        assert!(matches!(result, WizardResult::Completed(_)));
        assert_eq!(interaction.help_hits, 1);
    }

    #[test]
    fn cancel_midway_discards_record() {
        let engine = WizardEngine::new(&TestForm);
        let mut interaction =
            MockInteraction::new(vec![value("Plot"), PromptResponse::Cancel], vec![]);
        let mut sink = CollectSink::default();

        let result = engine.run(&mut interaction, &mut sink).unwrap();
        assert_eq!(result, WizardResult::Cancelled);
        assert_eq!(sink.accepted, 0);
    }

    #[test]
    fn summary_masks_passwords_and_marks_blanks() {
        let descriptor = WizardDescriptor::new(
            "login",
            vec![StepDescriptor::new(
                "account",
                "Account",
                vec![
                    FieldDescriptor::new("password", "Password", FieldKind::Password),
                    FieldDescriptor::new("phone", "Phone", FieldKind::Phone).with_optional(),
                ],
            )],
        );
        let mut record = ApplicationRecord::new();
        record.set("password", "s3cretpass");
        let lines = build_summary(&descriptor, &record).lines();
        assert!(lines.contains(&"  Password: ********".to_string()));
        assert!(lines.contains(&"  Phone: [unfilled]".to_string()));
        assert!(!lines.iter().any(|line| line.contains("s3cretpass")));
    }
}
