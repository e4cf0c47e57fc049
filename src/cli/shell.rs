use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};

use crate::cli::core::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::output::{self, info as output_info};
use crate::domain::{ApplicationKind, ApplicationStatus};
use crate::roles::{Permission, Role};
use crate::storage::ApplicationStore;

/// Commands whose first argument is an application ID.
const ID_COMMANDS: [&str; 7] = [
    "show",
    "confirm-email",
    "approve",
    "reject",
    "revise",
    "resubmit",
    "certificate",
];

const CONFIG_KEYS: [&str; 3] = ["chapter_name", "data_file", "password_min_length"];

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os("NITP_PORTAL_CLI_SCRIPT").is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    if mode == CliMode::Script {
        output::disable_colors();
    }
    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<PortalHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(PortalHelper::new(context.command_names())));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
    output_info(format!(
        "{} portal. Type `help` to list commands.",
        context.config.chapter_name
    ));

    while context.running {
        // Wizards and review commands change the collection between prompts.
        if let Some(helper) = editor.helper_mut() {
            helper.application_ids = application_ids(context);
        }

        match editor.readline(&context.prompt()) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();

                match handle_line(context, trimmed) {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::Exit) => break,
                    Err(err) => context.report_error(err)?,
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                output_info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    while context.running {
        let Some(line) = context.read_line()? else {
            break;
        };
        match handle_line(context, &line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(())
}

fn handle_line(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
    let tokens = parse_command_line(line)?;
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    context.last_command = Some(line.trim().to_string());

    match context.dispatch(&raw.to_lowercase(), raw, &args) {
        Ok(LoopControl::Exit) => {
            context.running = false;
            Ok(LoopControl::Exit)
        }
        other => other,
    }
}

fn application_ids(context: &ShellContext) -> Vec<String> {
    match context.store.list() {
        Ok(applications) => applications.into_iter().map(|app| app.id).collect(),
        Err(err) => {
            tracing::debug!(error = %err, "application IDs unavailable for completion");
            Vec::new()
        }
    }
}

/// Tokenizes a shell line, honouring quotes so review notes can contain spaces.
pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, CommandError> {
    shell_words::split(input)
        .map_err(|err| CommandError::InvalidArguments(format!("could not parse line: {}", err)))
}

/// Tab completion for command names and their first arguments.
struct PortalHelper {
    commands: Vec<String>,
    application_ids: Vec<String>,
}

impl PortalHelper {
    fn new(names: Vec<&'static str>) -> Self {
        let mut commands: Vec<String> = names.into_iter().map(str::to_string).collect();
        commands.sort();
        commands.dedup();
        Self {
            commands,
            application_ids: Vec::new(),
        }
    }

    /// Values that fit the next argument of `command` after `preceding`.
    fn argument_candidates(&self, command: &str, preceding: &[&str]) -> Vec<String> {
        let position = preceding.len();
        match (command, position) {
            (cmd, 0) if ID_COMMANDS.contains(&cmd) => self.application_ids.clone(),
            ("list", 0) => ApplicationStatus::ALL
                .iter()
                .map(|status| status.as_str())
                .chain(ApplicationKind::ALL.iter().map(|kind| kind.as_str()))
                .map(str::to_string)
                .collect(),
            ("toggle-permission", 0) => Role::ALL.iter().map(|r| r.as_str().to_string()).collect(),
            ("toggle-permission", 1) => Permission::ALL
                .iter()
                .map(|p| p.as_str().to_string())
                .collect(),
            ("config", 0) => vec!["show".to_string(), "set".to_string()],
            ("config", 1) if preceding[0].eq_ignore_ascii_case("set") => {
                CONFIG_KEYS.iter().map(|key| key.to_string()).collect()
            }
            ("help", 0) => self.commands.clone(),
            _ => Vec::new(),
        }
    }

    fn candidates(&self, prefix: &str) -> Vec<String> {
        let words: Vec<&str> = prefix.split_whitespace().collect();
        let completing_new_word = prefix.is_empty() || prefix.ends_with(char::is_whitespace);
        let (done, needle) = if completing_new_word {
            (words.as_slice(), "")
        } else {
            match words.split_last() {
                Some((last, done)) => (done, *last),
                None => (words.as_slice(), ""),
            }
        };

        let pool = match done.split_first() {
            None => self.commands.clone(),
            Some((command, args)) => {
                self.argument_candidates(&command.to_ascii_lowercase(), args)
            }
        };
        let needle = needle.to_ascii_lowercase();
        pool.into_iter()
            .filter(|candidate| candidate.to_ascii_lowercase().starts_with(&needle))
            .collect()
    }
}

impl Helper for PortalHelper {}

impl Completer for PortalHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let pairs = self
            .candidates(prefix)
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for PortalHelper {
    type Hint = String;
}

impl Highlighter for PortalHelper {}

impl Validator for PortalHelper {}
