//! Shell context, dispatch, and error plumbing for the portal CLI.

use std::io::{self, BufRead};
use std::path::PathBuf;

use dialoguer::theme::ColorfulTheme;
use strsim::levenshtein;

use crate::applications::{ApplicationIntake, IntakeForm};
use crate::config::{Config, ConfigManager};
use crate::domain::StoredApplication;
use crate::errors::PortalError;
use crate::roles::PermissionMatrix;
use crate::storage::JsonApplicationStore;
use crate::wizard::{WizardEngine, WizardFlow, WizardResult};

use super::commands::{self, CommandDefinition, CommandRegistry};
use super::interaction::{DialoguerInteraction, ScriptInteraction};
use super::io as cli_io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Portal(#[from] PortalError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("{0}")]
    Command(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Portal(#[from] PortalError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Portal(inner) => CliError::Portal(inner),
            CommandError::Io(inner) => CliError::Io(inner),
            other => CliError::Command(other.to_string()),
        }
    }
}

/// Everything a command handler can reach: settings, the application store,
/// the role matrix, and the input source used by scripted wizards.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub store: JsonApplicationStore,
    pub permissions: PermissionMatrix,
    pub last_command: Option<String>,
    pub running: bool,
    input: Box<dyn BufRead>,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let manager = ConfigManager::new()?;
        let input: Box<dyn BufRead> = Box::new(io::BufReader::new(io::stdin()));
        Self::with_manager(mode, manager, input)
    }

    /// Context rooted at `base`, reading scripted input from `input`.
    pub fn with_base_dir(
        mode: CliMode,
        base: PathBuf,
        input: Box<dyn BufRead>,
    ) -> Result<Self, CliError> {
        let manager = ConfigManager::with_base_dir(base)?;
        Self::with_manager(mode, manager, input)
    }

    fn with_manager(
        mode: CliMode,
        config_manager: ConfigManager,
        input: Box<dyn BufRead>,
    ) -> Result<Self, CliError> {
        let config = config_manager.load()?;
        let store = JsonApplicationStore::new(config_manager.data_path(&config));
        tracing::debug!(path = %store.path().display(), ?mode, "shell context ready");
        Ok(Self {
            mode,
            registry: CommandRegistry::new(commands::all_definitions()),
            theme: ColorfulTheme::default(),
            config_manager,
            config,
            store,
            permissions: PermissionMatrix::default(),
            last_command: None,
            running: true,
            input,
        })
    }

    pub fn prompt(&self) -> String {
        "nitp> ".to_string()
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandDefinition> {
        self.registry.get(name)
    }

    /// Next line of scripted input, `None` at end of input.
    pub(crate) fn read_line(&mut self) -> Result<Option<String>, CliError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Persists `config` and re-points the store at its data file.
    pub(crate) fn apply_config(&mut self, config: Config) -> CommandResult {
        self.config_manager.save(&config)?;
        self.store = JsonApplicationStore::new(self.config_manager.data_path(&config));
        self.config = config;
        Ok(())
    }

    /// Runs `flow` to completion and files the result in the store.
    pub(crate) fn run_wizard<F>(
        &mut self,
        flow: &F,
    ) -> Result<WizardResult<StoredApplication>, CommandError>
    where
        F: WizardFlow,
        F::Output: IntakeForm,
    {
        let engine = WizardEngine::new(flow);
        let mut intake = ApplicationIntake::new(&self.store);
        let result = match self.mode {
            CliMode::Interactive => {
                let mut interaction = DialoguerInteraction::new(&self.theme);
                engine.run(&mut interaction, &mut intake)?
            }
            CliMode::Script => {
                let mut interaction = ScriptInteraction::new(&mut *self.input);
                engine.run(&mut interaction, &mut intake)?
            }
        };
        Ok(result)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let handler = self.registry.get(command).map(|definition| definition.handler);
        if let Some(handler) = handler {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match crate::cli::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                self.print_warning(&err.to_string());
                return Ok(LoopControl::Continue);
            }
        };
        if tokens.is_empty() {
            return Ok(LoopControl::Continue);
        }
        let command = tokens[0].to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.dispatch(&command, &tokens[0], &args)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let mut suggestions: Vec<_> = self
            .registry
            .names()
            .map(|key| (levenshtein(key, &needle), key))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit shell?", true).map_err(CliError::from)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                self.print_error(&message);
                cli_io::print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Portal(PortalError::InvalidTransition { .. }) => {
                self.print_error(&err.to_string());
                cli_io::print_hint("Use `show <id>` to check the current status.");
                Ok(())
            }
            other => {
                self.print_error(&other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn print_error(&self, message: &str) {
        cli_io::print_error(message);
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }
}

/// Requires exactly one positional `<id>` argument.
pub(crate) fn single_id<'a>(args: &[&'a str], usage: &str) -> Result<&'a str, CommandError> {
    match args {
        [id] => Ok(id),
        _ => Err(CommandError::InvalidArguments(format!("usage: {}", usage))),
    }
}

/// Splits `<id> <notes...>` where notes may span several tokens.
pub(crate) fn id_and_notes(args: &[&str], usage: &str) -> Result<(String, String), CommandError> {
    match args.split_first() {
        Some((id, rest)) if !rest.is_empty() => Ok((id.to_string(), rest.join(" "))),
        _ => Err(CommandError::InvalidArguments(format!("usage: {}", usage))),
    }
}

#[cfg(test)]
pub(crate) fn process_script(base: PathBuf, script: &str) -> Result<ShellContext, CliError> {
    let input: Box<dyn BufRead> = Box::new(io::Cursor::new(script.to_string().into_bytes()));
    let mut context = ShellContext::with_base_dir(CliMode::Script, base, input)?;
    while let Some(line) = context.read_line()? {
        match context.process_line(&line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ApplicationStatus;
    use crate::roles::{Permission, Role};
    use crate::storage::ApplicationStore;
    use tempfile::tempdir;

    const SAR_SCRIPT: &str = "sar
Halima Yusuf
halima@example.com
08031234567


Plot 12, Jabi District
12
850
commercial
Mixed retail development
Flat corner plot


:cancel
exit
";

    #[test]
    fn parse_line_handles_quotes() {
        let tokens =
            crate::cli::shell::parse_command_line("reject APP-1 \"Missing survey plan\"").unwrap();
        assert_eq!(tokens, vec!["reject", "APP-1", "Missing survey plan"]);
    }

    #[test]
    fn cancelled_wizard_files_nothing() {
        let dir = tempdir().unwrap();
        let context = process_script(dir.path().to_path_buf(), SAR_SCRIPT).unwrap();
        assert!(context.store.list().unwrap().is_empty());
    }

    #[test]
    fn toggle_permission_updates_session_matrix() {
        let dir = tempdir().unwrap();
        let context = process_script(
            dir.path().to_path_buf(),
            "toggle-permission reviewer approve_applications\n",
        )
        .unwrap();
        assert!(context
            .permissions
            .allows(Role::Reviewer, Permission::ApproveApplications));
    }

    #[test]
    fn config_set_persists_chapter_name() {
        let dir = tempdir().unwrap();
        process_script(
            dir.path().to_path_buf(),
            "config set chapter_name \"FCT Chapter\"\n",
        )
        .unwrap();
        let reloaded = ConfigManager::with_base_dir(dir.path().to_path_buf())
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(reloaded.chapter_name, "FCT Chapter");
    }

    #[test]
    fn review_commands_report_without_aborting() {
        let dir = tempdir().unwrap();
        let context = process_script(
            dir.path().to_path_buf(),
            "approve APP-404\nreject APP-404\nstats\n",
        )
        .unwrap();
        assert!(context.running);
        assert_eq!(
            context
                .store
                .list()
                .unwrap()
                .iter()
                .filter(|app| app.status == ApplicationStatus::Approved)
                .count(),
            0
        );
    }
}
