use crate::cli::commands::CommandDefinition;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output;
use crate::roles::{Permission, Role};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "roles",
            "Show the role/permission matrix",
            "roles",
            cmd_roles,
        ),
        CommandDefinition::new(
            "toggle-permission",
            "Grant or revoke a permission for this session",
            "toggle-permission <role> <permission>",
            cmd_toggle_permission,
        ),
        CommandDefinition::new(
            "config",
            "View or change portal settings",
            "config [show|set <chapter_name|data_file|password_min_length> <value>]",
            cmd_config,
        ),
    ]
}

fn cmd_roles(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let mut headers = vec!["ROLE"];
    headers.extend(Permission::ALL.iter().map(|permission| permission.as_str()));
    let rows: Vec<Vec<String>> = Role::ALL
        .iter()
        .map(|role| {
            let mut row = vec![role.as_str().to_string()];
            row.extend(Permission::ALL.iter().map(|permission| {
                if context.permissions.allows(*role, *permission) {
                    "yes".to_string()
                } else {
                    "-".to_string()
                }
            }));
            row
        })
        .collect();
    io::print_table(&headers, &rows);
    Ok(())
}

fn cmd_toggle_permission(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [role, permission] = args else {
        return Err(CommandError::InvalidArguments(
            "usage: toggle-permission <role> <permission>".into(),
        ));
    };
    let role: Role = role.parse().map_err(CommandError::InvalidArguments)?;
    let permission: Permission = permission.parse().map_err(CommandError::InvalidArguments)?;
    let granted = context.permissions.toggle(role, permission)?;
    let verb = if granted { "granted to" } else { "revoked from" };
    io::print_success(format!("{} {} {}.", permission, verb, role));
    Ok(())
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        output::section("Configuration");
        io::print_info(format!("  chapter_name        : {}", context.config.chapter_name));
        io::print_info(format!("  data_file           : {}", context.config.data_file));
        io::print_info(format!(
            "  password_min_length : {}",
            context.config.password_min_length
        ));
        io::print_info(format!(
            "  data directory      : {}",
            context.config_manager.base_dir().display()
        ));
        return Ok(());
    }

    if !args[0].eq_ignore_ascii_case("set") || args.len() < 3 {
        return Err(CommandError::InvalidArguments(
            "usage: config set <chapter_name|data_file|password_min_length> <value>".into(),
        ));
    }

    let key = args[1].to_ascii_lowercase();
    let value = args[2..].join(" ");
    let value = value.trim();
    let mut config = context.config.clone();
    match key.as_str() {
        "chapter_name" => config.chapter_name = value.to_string(),
        "data_file" => config.data_file = value.to_string(),
        "password_min_length" => {
            config.password_min_length = value.parse().map_err(|_| {
                CommandError::InvalidArguments(format!(
                    "password_min_length must be a whole number (got `{}`)",
                    value
                ))
            })?;
        }
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown setting `{}`",
                other
            )))
        }
    }
    context.apply_config(config)?;
    io::print_success(format!("Updated {}.", key));
    Ok(())
}
