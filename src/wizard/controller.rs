//! Step-gated state machine shared by every application wizard.
//!
//! The controller owns the accumulating [`ApplicationRecord`] for a single
//! run. It only tracks the active step index and the published error set;
//! rendering and input collection belong to the caller (see
//! [`super::engine::WizardEngine`] for the terminal driver).

use std::collections::BTreeSet;

use crate::domain::{ApplicationRecord, FieldValue};
use crate::errors::Result;

use super::descriptor::{StepDescriptor, WizardDescriptor};
use super::flow::{Submission, SubmissionSink, WizardFlow};
use super::validation::ValidationErrorSet;

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced,
    /// The active step has errors; see [`WizardController::errors`].
    Blocked,
    AtLastStep,
    Retreated,
    AtFirstStep,
    /// The wizard was already submitted.
    Closed,
}

/// Result of a submission request. Validation failures are not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome<R> {
    Submitted(R),
    Blocked,
    NotReady,
    AlreadySubmitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    InProgress,
    Submitted,
}

pub struct WizardController<'a, F: WizardFlow> {
    flow: &'a F,
    record: ApplicationRecord,
    errors: ValidationErrorSet,
    index: usize,
    state: WizardState,
}

impl<'a, F: WizardFlow> WizardController<'a, F> {
    pub fn new(flow: &'a F) -> Self {
        Self {
            flow,
            record: flow.defaults(),
            errors: ValidationErrorSet::new(),
            index: 0,
            state: WizardState::InProgress,
        }
    }

    pub fn descriptor(&self) -> &'a WizardDescriptor {
        self.flow.descriptor()
    }

    pub fn current_step_index(&self) -> usize {
        self.index
    }

    pub fn current_step(&self) -> Option<&'a StepDescriptor> {
        self.descriptor().step(self.index)
    }

    pub fn total_steps(&self) -> usize {
        self.descriptor().total_steps()
    }

    pub fn is_first_step(&self) -> bool {
        self.index == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.index + 1 >= self.total_steps()
    }

    pub fn record(&self) -> &ApplicationRecord {
        &self.record
    }

    pub fn errors(&self) -> &ValidationErrorSet {
        &self.errors
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    /// Required keys of the active step, derived from the current record.
    pub fn required_fields(&self) -> BTreeSet<&'static str> {
        self.required_fields_at(self.index)
    }

    pub fn required_fields_at(&self, index: usize) -> BTreeSet<&'static str> {
        self.descriptor()
            .step(index)
            .map(|step| step.required_fields(&self.record))
            .unwrap_or_default()
    }

    pub fn go_next(&mut self) -> StepOutcome {
        if self.state == WizardState::Submitted {
            return StepOutcome::Closed;
        }
        let errors = self.descriptor().validate_step(self.index, &self.record);
        if !errors.is_empty() {
            tracing::debug!(
                wizard = self.descriptor().name,
                step = self.index,
                errors = errors.len(),
                "step blocked by validation"
            );
            self.errors = errors;
            return StepOutcome::Blocked;
        }
        self.errors.clear();
        if self.is_last_step() {
            return StepOutcome::AtLastStep;
        }
        self.index += 1;
        tracing::debug!(wizard = self.descriptor().name, step = self.index, "advanced");
        StepOutcome::Advanced
    }

    pub fn go_previous(&mut self) -> StepOutcome {
        if self.state == WizardState::Submitted {
            return StepOutcome::Closed;
        }
        self.errors.clear();
        if self.index == 0 {
            return StepOutcome::AtFirstStep;
        }
        self.index -= 1;
        tracing::debug!(wizard = self.descriptor().name, step = self.index, "went back");
        StepOutcome::Retreated
    }

    /// Writes `value` and drops the published error for `key`, if any.
    pub fn update_field(&mut self, key: &str, value: impl Into<FieldValue>) {
        if self.state == WizardState::Submitted {
            tracing::warn!(
                wizard = self.descriptor().name,
                field = key,
                "ignoring edit after submission"
            );
            return;
        }
        self.record.set(key, value);
        self.errors.remove(key);
    }

    /// Validates the final step, re-checks earlier steps, then hands the
    /// typed output to `sink`.
    ///
    /// When an earlier step no longer validates it becomes the active step.
    pub fn submit<S>(&mut self, sink: &mut S) -> Result<SubmitOutcome<S::Receipt>>
    where
        S: SubmissionSink<F::Output>,
    {
        if self.state == WizardState::Submitted {
            return Ok(SubmitOutcome::AlreadySubmitted);
        }
        if !self.is_last_step() {
            return Ok(SubmitOutcome::NotReady);
        }

        let descriptor = self.descriptor();
        let errors = descriptor.validate_step(self.index, &self.record);
        if !errors.is_empty() {
            self.errors = errors;
            return Ok(SubmitOutcome::Blocked);
        }
        for earlier in 0..self.index {
            let errors = descriptor.validate_step(earlier, &self.record);
            if !errors.is_empty() {
                tracing::debug!(
                    wizard = descriptor.name,
                    step = earlier,
                    "earlier step no longer validates"
                );
                self.index = earlier;
                self.errors = errors;
                return Ok(SubmitOutcome::Blocked);
            }
        }

        let data = self.flow.commit(&self.record)?;
        let documents = descriptor.document_tally(&self.record);
        let receipt = sink.accept(Submission {
            data,
            record: descriptor.redacted(&self.record),
            documents,
        })?;

        self.errors.clear();
        self.state = WizardState::Submitted;
        tracing::info!(wizard = descriptor.name, "wizard submitted");
        Ok(SubmitOutcome::Submitted(receipt))
    }
}
