use crate::applications::{EiarWizard, RegistrationWizard, SarWizard};
use crate::cli::commands::CommandDefinition;
use crate::cli::core::{single_id, CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::io;
use crate::cli::output;
use crate::domain::{ApplicationKind, ApplicationStatus, StoredApplication};
use crate::storage::ApplicationStore;
use crate::wizard::WizardResult;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "register",
            "Apply for chapter membership",
            "register",
            cmd_register,
        ),
        CommandDefinition::new(
            "sar",
            "Submit a Site Analysis Report",
            "sar",
            cmd_sar,
        ),
        CommandDefinition::new(
            "eiar",
            "Submit an Environmental Impact Assessment Report",
            "eiar",
            cmd_eiar,
        ),
        CommandDefinition::new(
            "list",
            "List applications, newest first",
            "list [status|kind]",
            cmd_list,
        ),
        CommandDefinition::new(
            "show",
            "Show one application with its form answers",
            "show <id>",
            cmd_show,
        ),
    ]
}

fn report_outcome(outcome: WizardResult<StoredApplication>) {
    match outcome {
        WizardResult::Completed(app) => {
            io::print_success(format!(
                "Application {} submitted ({}).",
                app.id, app.status
            ));
            if app.status == ApplicationStatus::PendingEmail {
                io::print_hint(format!(
                    "A confirmation email goes to {}. Run `confirm-email {}` once verified.",
                    app.email, app.id
                ));
            }
        }
        WizardResult::Cancelled => io::print_warning("Application cancelled; nothing was saved."),
    }
}

fn no_arguments(args: &[&str], usage: &str) -> CommandResult {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CommandError::InvalidArguments(format!("usage: {}", usage)))
    }
}

fn cmd_register(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    no_arguments(args, "register")?;
    let wizard = RegistrationWizard::new(context.config.password_min_length);
    help::print_wizard_controls();
    let outcome = context.run_wizard(&wizard)?;
    report_outcome(outcome);
    Ok(())
}

fn cmd_sar(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    no_arguments(args, "sar")?;
    help::print_wizard_controls();
    let outcome = context.run_wizard(&SarWizard::new())?;
    report_outcome(outcome);
    Ok(())
}

fn cmd_eiar(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    no_arguments(args, "eiar")?;
    help::print_wizard_controls();
    let outcome = context.run_wizard(&EiarWizard::new())?;
    report_outcome(outcome);
    Ok(())
}

enum ListFilter {
    All,
    Status(ApplicationStatus),
    Kind(ApplicationKind),
}

impl ListFilter {
    fn parse(args: &[&str]) -> Result<Self, CommandError> {
        match args {
            [] => Ok(ListFilter::All),
            [value] => value
                .parse::<ApplicationStatus>()
                .map(ListFilter::Status)
                .or_else(|_| value.parse::<ApplicationKind>().map(ListFilter::Kind))
                .map_err(|_| {
                    CommandError::InvalidArguments(format!(
                        "`{}` is neither a status nor an application kind",
                        value
                    ))
                }),
            _ => Err(CommandError::InvalidArguments(
                "usage: list [status|kind]".into(),
            )),
        }
    }

    fn matches(&self, app: &StoredApplication) -> bool {
        match self {
            ListFilter::All => true,
            ListFilter::Status(status) => app.status == *status,
            ListFilter::Kind(kind) => app.kind == *kind,
        }
    }
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let filter = ListFilter::parse(args)?;
    let rows: Vec<Vec<String>> = context
        .store
        .list()?
        .iter()
        .filter(|app| filter.matches(app))
        .map(|app| {
            vec![
                app.id.clone(),
                app.kind.to_string(),
                app.applicant_name.clone(),
                app.status.to_string(),
                app.documents.to_string(),
                app.submitted_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();

    if rows.is_empty() {
        io::print_info("No applications found.");
        return Ok(());
    }
    io::print_table(
        &["ID", "KIND", "APPLICANT", "STATUS", "DOCS", "SUBMITTED"],
        &rows,
    );
    Ok(())
}

fn cmd_show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = single_id(args, "show <id>")?;
    let app = context.store.get(id)?;

    output::section(format!("{} ({})", app.id, app.kind.label()));
    io::print_info(format!("  Applicant    : {} <{}>", app.applicant_name, app.email));
    if let Some(kind) = app.membership_type {
        io::print_info(format!("  Membership   : {}", kind.label()));
    }
    io::print_info(format!("  Status       : {}", app.status));
    io::print_info(format!(
        "  Submitted    : {}",
        app.submitted_at.format("%Y-%m-%d %H:%M UTC")
    ));
    io::print_info(format!("  Documents    : {}", app.documents));
    if let Some(notes) = &app.review_notes {
        io::print_info(format!("  Review notes : {}", notes));
    }
    if let Some(reviewed) = app.reviewed_at {
        io::print_info(format!(
            "  Reviewed     : {}",
            reviewed.format("%Y-%m-%d %H:%M UTC")
        ));
    }
    if let Some(membership_id) = &app.membership_id {
        io::print_info(format!("  Membership ID: {}", membership_id));
    }

    output::section("Form data");
    for (key, value) in app.form_data.iter() {
        output::plain(format!("  {}: {}", key, value));
    }
    Ok(())
}
