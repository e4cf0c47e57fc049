use crate::certificate::render_certificate;
use crate::cli::commands::CommandDefinition;
use crate::cli::core::{id_and_notes, single_id, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::domain::{ApplicationKind, ApplicationStatus};
use crate::review::ReviewService;
use crate::storage::ApplicationStore;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "confirm-email",
            "Record the applicant's email confirmation",
            "confirm-email <id>",
            cmd_confirm_email,
        ),
        CommandDefinition::new(
            "approve",
            "Approve an application under review",
            "approve <id>",
            cmd_approve,
        ),
        CommandDefinition::new(
            "reject",
            "Reject an application with notes",
            "reject <id> <notes>",
            cmd_reject,
        ),
        CommandDefinition::new(
            "revise",
            "Request a revision with notes",
            "revise <id> <notes>",
            cmd_revise,
        ),
        CommandDefinition::new(
            "resubmit",
            "Return a revised application to review",
            "resubmit <id>",
            cmd_resubmit,
        ),
        CommandDefinition::new(
            "certificate",
            "Preview the certificate of an approved membership",
            "certificate <id>",
            cmd_certificate,
        ),
        CommandDefinition::new(
            "stats",
            "Show dashboard statistics",
            "stats",
            cmd_stats,
        ),
    ]
}

fn cmd_confirm_email(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = single_id(args, "confirm-email <id>")?;
    let app = ReviewService::new(&context.store).confirm_email(id)?;
    io::print_success(format!("Email confirmed; {} is now {}.", app.id, app.status));
    Ok(())
}

fn cmd_approve(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = single_id(args, "approve <id>")?;
    let app = ReviewService::new(&context.store).approve(id)?;
    match &app.membership_id {
        Some(membership_id) => io::print_success(format!(
            "Approved {}. Membership ID issued: {}",
            app.id, membership_id
        )),
        None => io::print_success(format!("Approved {}.", app.id)),
    }
    Ok(())
}

fn cmd_reject(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (id, notes) = id_and_notes(args, "reject <id> <notes>")?;
    let app = ReviewService::new(&context.store).reject(&id, &notes)?;
    io::print_success(format!("Rejected {}.", app.id));
    Ok(())
}

fn cmd_revise(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (id, notes) = id_and_notes(args, "revise <id> <notes>")?;
    let app = ReviewService::new(&context.store).request_revision(&id, &notes)?;
    io::print_success(format!("Revision requested for {}.", app.id));
    Ok(())
}

fn cmd_resubmit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = single_id(args, "resubmit <id>")?;
    let app = ReviewService::new(&context.store).resubmit(id)?;
    io::print_success(format!("{} is back in the review queue.", app.id));
    Ok(())
}

fn cmd_certificate(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = single_id(args, "certificate <id>")?;
    let app = context.store.get(id)?;
    let text = render_certificate(&app, &context.config.chapter_name)?;
    output::plain(text);
    Ok(())
}

fn cmd_stats(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let stats = ReviewService::new(&context.store).statistics()?;
    output::section("Dashboard");
    io::print_info(format!("  Total applications : {}", stats.total));
    for status in ApplicationStatus::ALL {
        io::print_info(format!(
            "  {:<19}: {}",
            status.as_str(),
            stats.status_count(status)
        ));
    }
    for kind in ApplicationKind::ALL {
        io::print_info(format!("  {:<19}: {}", kind.as_str(), stats.kind_count(kind)));
    }
    Ok(())
}
