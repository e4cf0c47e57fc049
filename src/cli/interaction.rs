//! Terminal and scripted front ends for [`WizardEngine`](crate::wizard::WizardEngine).

use std::io::BufRead;

use dialoguer::{theme::ColorfulTheme, Input, Password, Select};

use crate::cli::io;
use crate::cli::output;
use crate::wizard::{
    ConfirmationResponse, FieldDescriptor, FieldKind, PromptContext, PromptResponse,
    StepDescriptor, ValidationError, ValidationErrorSet, WizardInteraction, WizardSummary,
};

const BACK_TOKEN: &str = ":back";
const HELP_TOKEN: &str = ":help";
const CANCEL_TOKEN: &str = ":cancel";
const BACK_LABEL: &str = "<- Back";

/// Maps a typed line onto a prompt response. Blank input keeps the current value.
pub fn parse_response(line: &str) -> PromptResponse {
    let trimmed = line.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "" => PromptResponse::Keep,
        BACK_TOKEN => PromptResponse::Back,
        HELP_TOKEN => PromptResponse::Help,
        CANCEL_TOKEN => PromptResponse::Cancel,
        _ => PromptResponse::Value(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}

fn field_prompt(context: &PromptContext<'_>) -> String {
    let marker = if context.required { "" } else { " (optional)" };
    match context.current_display() {
        Some(current) => format!("{}{} [{}]", context.field.label, marker, current),
        None => format!("{}{}", context.field.label, marker),
    }
}

fn step_banner(step: &StepDescriptor, index: usize, total: usize) -> String {
    format!("Step {} of {}: {}", index + 1, total, step.title)
}

fn help_text(field: &FieldDescriptor) -> String {
    field
        .help
        .map(str::to_string)
        .unwrap_or_else(|| "No additional information available for this field.".into())
}

/// Prompts through dialoguer widgets on the controlling terminal.
pub struct DialoguerInteraction<'t> {
    theme: &'t ColorfulTheme,
}

impl<'t> DialoguerInteraction<'t> {
    pub fn new(theme: &'t ColorfulTheme) -> Self {
        Self { theme }
    }

    fn prompt_text(&self, context: &PromptContext<'_>) -> PromptResponse {
        let hint = if context.first_field && context.step_index == 0 {
            ""
        } else {
            " (:back)"
        };
        let result = Input::<String>::with_theme(self.theme)
            .with_prompt(format!("{}{}", field_prompt(context), hint))
            .allow_empty(true)
            .interact_text();
        match result {
            Ok(line) => parse_response(&line),
            Err(_) => PromptResponse::Cancel,
        }
    }

    fn prompt_password(&self, context: &PromptContext<'_>) -> PromptResponse {
        let result = Password::with_theme(self.theme)
            .with_prompt(field_prompt(context))
            .allow_empty_password(true)
            .interact();
        match result {
            Ok(secret) if secret.is_empty() => PromptResponse::Keep,
            Ok(secret) => parse_response(&secret),
            Err(_) => PromptResponse::Cancel,
        }
    }

    fn prompt_select(&self, context: &PromptContext<'_>, labels: Vec<String>) -> PromptResponse {
        let option_count = labels.len();
        let mut items = labels;
        items.push(BACK_LABEL.to_string());

        let result = Select::with_theme(self.theme)
            .with_prompt(field_prompt(context))
            .items(&items)
            .default(0)
            .interact_opt();
        match result {
            Ok(Some(index)) if index < option_count => PromptResponse::Value((index + 1).to_string()),
            Ok(Some(_)) => PromptResponse::Back,
            Ok(None) | Err(_) => PromptResponse::Cancel,
        }
    }
}

impl WizardInteraction for DialoguerInteraction<'_> {
    fn begin_step(&mut self, step: &StepDescriptor, index: usize, total: usize) {
        output::section(step_banner(step, index, total));
    }

    fn prompt_field(&mut self, context: &PromptContext<'_>) -> PromptResponse {
        match &context.field.kind {
            FieldKind::Choice(options) => {
                let labels = options.iter().map(|option| option.label.clone()).collect();
                self.prompt_select(context, labels)
            }
            FieldKind::Boolean => match self.prompt_select(context, vec!["Yes".into(), "No".into()]) {
                PromptResponse::Value(position) if position == "1" => {
                    PromptResponse::Value("yes".into())
                }
                PromptResponse::Value(_) => PromptResponse::Value("no".into()),
                other => other,
            },
            FieldKind::Password => self.prompt_password(context),
            _ => self.prompt_text(context),
        }
    }

    fn show_help(&mut self, field: &FieldDescriptor) {
        io::print_info(help_text(field));
    }

    fn report_input_error(&mut self, field: &FieldDescriptor, error: &ValidationError) {
        io::print_warning(format!("{}: {}", field.label, error));
    }

    fn report_errors(&mut self, step: &StepDescriptor, errors: &ValidationErrorSet) {
        io::print_warning(format!("Please fix the following in {}:", step.title));
        for (field, message) in errors.iter() {
            let label = step.field(field).map(|f| f.label).unwrap_or(field);
            io::print_warning(format!("  {}: {}", label, message));
        }
    }

    fn confirm(&mut self, summary: &WizardSummary) -> ConfirmationResponse {
        output::section("Summary");
        for line in summary.lines() {
            output::plain(line);
        }
        let items = ["Submit", "Back to the last field", "Cancel"];
        match Select::with_theme(self.theme)
            .with_prompt("Submit this application?")
            .items(&items)
            .default(0)
            .interact_opt()
        {
            Ok(Some(0)) => ConfirmationResponse::Confirm,
            Ok(Some(1)) => ConfirmationResponse::Back,
            _ => ConfirmationResponse::Cancel,
        }
    }
}

/// Reads one line per prompt from `input`; end of input cancels the wizard.
///
/// Choice fields accept the option value, its label, or its 1-based position.
/// Confirmation accepts `yes`/`submit`, `:back`, or anything else to cancel.
pub struct ScriptInteraction<R: BufRead> {
    input: R,
}

impl<R: BufRead> ScriptInteraction<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    fn next_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

impl<R: BufRead> WizardInteraction for ScriptInteraction<R> {
    fn begin_step(&mut self, step: &StepDescriptor, index: usize, total: usize) {
        output::section(step_banner(step, index, total));
    }

    fn prompt_field(&mut self, context: &PromptContext<'_>) -> PromptResponse {
        output::prompt(field_prompt(context));
        match self.next_line() {
            Some(line) => parse_response(&line),
            None => PromptResponse::Cancel,
        }
    }

    fn show_help(&mut self, field: &FieldDescriptor) {
        io::print_info(help_text(field));
    }

    fn report_input_error(&mut self, field: &FieldDescriptor, error: &ValidationError) {
        io::print_warning(format!("{}: {}", field.label, error));
    }

    fn report_errors(&mut self, step: &StepDescriptor, errors: &ValidationErrorSet) {
        for (field, message) in errors.iter() {
            let label = step.field(field).map(|f| f.label).unwrap_or(field);
            io::print_warning(format!("{}: {}", label, message));
        }
    }

    fn confirm(&mut self, summary: &WizardSummary) -> ConfirmationResponse {
        for line in summary.lines() {
            output::plain(line);
        }
        output::prompt("Submit? (yes/:back/no)");
        match self.next_line() {
            Some(line) => match line.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" | "submit" => ConfirmationResponse::Confirm,
                BACK_TOKEN => ConfirmationResponse::Back,
                _ => ConfirmationResponse::Cancel,
            },
            None => ConfirmationResponse::Cancel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parse_response_recognises_control_tokens() {
        assert_eq!(parse_response(""), PromptResponse::Keep);
        assert_eq!(parse_response("  :BACK "), PromptResponse::Back);
        assert_eq!(parse_response(":help"), PromptResponse::Help);
        assert_eq!(parse_response(":cancel"), PromptResponse::Cancel);
        assert_eq!(
            parse_response("Plot 4, Wuse"),
            PromptResponse::Value("Plot 4, Wuse".into())
        );
    }

    #[test]
    fn script_confirmation_reads_next_line() {
        let mut interaction = ScriptInteraction::new(Cursor::new("yes\n:back\nnope\n"));
        let summary = WizardSummary::default();
        assert_eq!(interaction.confirm(&summary), ConfirmationResponse::Confirm);
        assert_eq!(interaction.confirm(&summary), ConfirmationResponse::Back);
        assert_eq!(interaction.confirm(&summary), ConfirmationResponse::Cancel);
        assert_eq!(interaction.confirm(&summary), ConfirmationResponse::Cancel);
    }
}
