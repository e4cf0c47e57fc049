use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::domain::{ApplicationRecord, DocumentTally, FieldValue, FileHandle};

use super::validation::{ValidationError, ValidationErrorSet, Validator};

/// One selectable option of a [`FieldKind::Choice`] field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
}

impl ChoiceOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Supported data kinds for wizard fields.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Phone,
    Number,
    Date,
    Boolean,
    Choice(Vec<ChoiceOption>),
    File,
}

impl FieldKind {
    /// Converts raw prompt input into a typed value.
    ///
    /// Choices accept the stored value, the display label, or the 1-based
    /// position. File input is a path that must point at an existing file.
    pub fn parse_input(&self, raw: &str) -> Result<FieldValue, ValidationError> {
        let trimmed = raw.trim();
        match self {
            FieldKind::Password => Ok(FieldValue::Text(raw.to_string())),
            FieldKind::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "y" | "yes" | "true" | "1" => Ok(FieldValue::Flag(true)),
                "n" | "no" | "false" | "0" => Ok(FieldValue::Flag(false)),
                _ => Err(ValidationError::new(
                    "Enter yes/no, true/false, or 1/0 to indicate boolean values",
                )),
            },
            FieldKind::Choice(options) => resolve_choice(options, trimmed)
                .map(|option| FieldValue::Text(option.value.clone()))
                .ok_or_else(|| {
                    let values: Vec<&str> =
                        options.iter().map(|option| option.value.as_str()).collect();
                    ValidationError::new(format!(
                        "Select one of: {}",
                        values.join(", ")
                    ))
                }),
            FieldKind::File => file_handle_from_path(Path::new(trimmed)).map(FieldValue::File),
            _ => Ok(FieldValue::Text(trimmed.to_string())),
        }
    }

    pub fn options(&self) -> &[ChoiceOption] {
        match self {
            FieldKind::Choice(options) => options,
            _ => &[],
        }
    }
}

fn resolve_choice<'a>(options: &'a [ChoiceOption], input: &str) -> Option<&'a ChoiceOption> {
    if let Ok(position) = input.parse::<usize>() {
        if position >= 1 {
            if let Some(option) = options.get(position - 1) {
                return Some(option);
            }
        }
    }
    options.iter().find(|option| {
        option.value.eq_ignore_ascii_case(input) || option.label.eq_ignore_ascii_case(input)
    })
}

fn file_handle_from_path(path: &Path) -> Result<FileHandle, ValidationError> {
    if path.as_os_str().is_empty() {
        return Err(ValidationError::new("Enter the path of the document to upload"));
    }
    let metadata = fs::metadata(path)
        .map_err(|_| ValidationError::new(format!("File not found: {}", path.display())))?;
    if !metadata.is_file() {
        return Err(ValidationError::new(format!(
            "Not a regular file: {}",
            path.display()
        )));
    }
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("document")
        .to_string();
    Ok(FileHandle {
        name,
        size_bytes: metadata.len(),
        path: Some(path.display().to_string()),
    })
}

const REDACTED: &str = "[redacted]";

type RequirementPredicate = dyn Fn(&ApplicationRecord) -> bool + Send + Sync;

/// Whether a field must be filled in, possibly depending on earlier answers.
#[derive(Clone)]
pub enum Requirement {
    Required,
    Optional,
    When(Arc<RequirementPredicate>),
}

impl Requirement {
    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn(&ApplicationRecord) -> bool + Send + Sync + 'static,
    {
        Requirement::When(Arc::new(predicate))
    }

    /// Evaluated against the live record on every call.
    pub fn is_required(&self, record: &ApplicationRecord) -> bool {
        match self {
            Requirement::Required => true,
            Requirement::Optional => false,
            Requirement::When(predicate) => predicate(record),
        }
    }
}

impl fmt::Debug for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Required => f.write_str("Required"),
            Requirement::Optional => f.write_str("Optional"),
            Requirement::When(_) => f.write_str("When(..)"),
        }
    }
}

/// Declarative description of a single wizard field.
#[derive(Clone)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub requirement: Requirement,
    pub help: Option<&'static str>,
    pub validator: Validator,
}

impl FieldDescriptor {
    /// Choice fields start with a one-of check over their option values.
    pub fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        let validator = match &kind {
            FieldKind::Choice(options) => Validator::OneOf(
                options.iter().map(|option| option.value.clone()).collect(),
            ),
            _ => Validator::None,
        };
        Self {
            key,
            label,
            kind,
            requirement: Requirement::Required,
            help: None,
            validator,
        }
    }

    pub fn with_optional(mut self) -> Self {
        self.requirement = Requirement::Optional;
        self
    }

    pub fn required_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ApplicationRecord) -> bool + Send + Sync + 'static,
    {
        self.requirement = Requirement::when(predicate);
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    /// Declaration checkbox: required and must be ticked.
    pub fn declaration(key: &'static str, label: &'static str) -> Self {
        Self::new(key, label, FieldKind::Boolean).with_validator(Validator::MustAccept)
    }

    pub fn is_required(&self, record: &ApplicationRecord) -> bool {
        self.requirement.is_required(record)
    }

    fn missing_message(&self) -> String {
        match (&self.kind, &self.validator) {
            (FieldKind::File, _) => format!("{} must be uploaded", self.label),
            (_, Validator::MustAccept) => format!("{} must be accepted", self.label),
            _ => format!("{} is required", self.label),
        }
    }

    /// Checks this field against the record; `None` when it passes.
    pub fn check(&self, record: &ApplicationRecord) -> Option<String> {
        let value = record.get(self.key).filter(|value| value.is_present());
        match value {
            None if self.is_required(record) => Some(self.missing_message()),
            None => None,
            Some(value) => match self.validator.validate(value, record) {
                Ok(()) => None,
                Err(_) if matches!(self.validator, Validator::MustAccept) => {
                    Some(self.missing_message())
                }
                Err(err) => Some(err.message),
            },
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("requirement", &self.requirement)
            .finish()
    }
}

/// One page of a wizard.
#[derive(Debug, Clone)]
pub struct StepDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    pub fields: Vec<FieldDescriptor>,
}

impl StepDescriptor {
    pub fn new(id: &'static str, title: &'static str, fields: Vec<FieldDescriptor>) -> Self {
        Self { id, title, fields }
    }

    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.key == key)
    }

    /// Keys that must be filled in given the current answers.
    pub fn required_fields(&self, record: &ApplicationRecord) -> BTreeSet<&'static str> {
        self.fields
            .iter()
            .filter(|field| field.is_required(record))
            .map(|field| field.key)
            .collect()
    }

    pub fn validate(&self, record: &ApplicationRecord) -> ValidationErrorSet {
        let mut errors = ValidationErrorSet::new();
        for field in &self.fields {
            if let Some(message) = field.check(record) {
                errors.insert(field.key, message);
            }
        }
        errors
    }
}

/// Metadata describing a full wizard, including step order.
#[derive(Debug, Clone)]
pub struct WizardDescriptor {
    pub name: &'static str,
    pub steps: Vec<StepDescriptor>,
}

impl WizardDescriptor {
    pub fn new(name: &'static str, steps: Vec<StepDescriptor>) -> Self {
        Self { name, steps }
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn step(&self, index: usize) -> Option<&StepDescriptor> {
        self.steps.get(index)
    }

    pub fn step_index(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.id == id)
    }

    pub fn validate_step(&self, index: usize, record: &ApplicationRecord) -> ValidationErrorSet {
        self.step(index)
            .map(|step| step.validate(record))
            .unwrap_or_default()
    }

    /// Copy of `record` with password answers masked, safe to persist.
    pub fn redacted(&self, record: &ApplicationRecord) -> ApplicationRecord {
        let mut copy = record.clone();
        for field in self
            .steps
            .iter()
            .flat_map(|step| step.fields.iter())
            .filter(|field| matches!(field.kind, FieldKind::Password))
        {
            if record.is_present(field.key) {
                copy.set(field.key, REDACTED);
            }
        }
        copy
    }

    /// Counts uploaded documents against the documents currently required.
    pub fn document_tally(&self, record: &ApplicationRecord) -> DocumentTally {
        let mut tally = DocumentTally::default();
        for field in self
            .steps
            .iter()
            .flat_map(|step| step.fields.iter())
            .filter(|field| matches!(field.kind, FieldKind::File))
        {
            if record.file(field.key).is_some() {
                tally.uploaded += 1;
            }
            if field.is_required(record) {
                tally.required += 1;
            }
        }
        tally
    }
}
