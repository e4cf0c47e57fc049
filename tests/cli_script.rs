mod common;

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

use common::student_registration_lines;

fn portal_cli(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("nitp_portal_cli").unwrap();
    cmd.env("NITP_PORTAL_CLI_SCRIPT", "1")
        .env("NITP_PORTAL_HOME", home)
        .env("RUST_LOG", "off");
    cmd
}

fn stored_ids(home: &Path) -> Vec<String> {
    let json = fs::read_to_string(home.join("applications.json")).unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();
    value
        .as_object()
        .expect("collection is a JSON object")
        .keys()
        .cloned()
        .collect()
}

#[test]
fn script_mode_registers_and_reviews_a_member() {
    let home = TempDir::new().unwrap();
    let mut input = vec!["register".to_string()];
    input.extend(student_registration_lines(home.path()));
    input.push("list pending_email".into());
    input.push("exit".into());

    portal_cli(home.path())
        .write_stdin(input.join("\n") + "\n")
        .assert()
        .success()
        .stdout(contains("submitted (pending_email)"))
        .stdout(contains("Ngozi Eze"));

    let ids = stored_ids(home.path());
    assert_eq!(ids.len(), 1);
    let id = &ids[0];

    let review = format!(
        "approve {id}\nconfirm-email {id}\napprove {id}\ncertificate {id}\nstats\nexit\n"
    );
    portal_cli(home.path())
        .write_stdin(review)
        .assert()
        .success()
        .stdout(contains("while it is pending_email"))
        .stdout(contains("Membership ID issued: TPA362"))
        .stdout(contains("CERTIFICATE OF MEMBERSHIP"));
}

#[test]
fn unknown_command_suggests_closest_match() {
    let home = TempDir::new().unwrap();
    portal_cli(home.path())
        .write_stdin("aprove APP-1\nexit\n")
        .assert()
        .success()
        .stdout(contains("Unknown command `aprove`"))
        .stdout(contains("Suggestion: `approve`?"));
}

#[test]
fn roles_and_config_commands_work_in_script_mode() {
    let home = TempDir::new().unwrap();
    portal_cli(home.path())
        .write_stdin(
            "toggle-permission super_admin manage_roles\n\
             toggle-permission finance view_reports\n\
             config set password_min_length 10\n\
             config\n\
             exit\n",
        )
        .assert()
        .success()
        .stdout(contains("super_admin always keeps manage_roles"))
        .stdout(contains("view_reports revoked from finance"))
        .stdout(contains("password_min_length : 10"));

    let config = fs::read_to_string(home.path().join("config.json")).unwrap();
    assert!(config.contains("\"password_min_length\": 10"));
}

#[test]
fn version_reports_release_and_data_file() {
    let home = TempDir::new().unwrap();
    portal_cli(home.path())
        .write_stdin("version\nexit\n")
        .assert()
        .success()
        .stdout(contains(format!("NITP Portal {}", env!("CARGO_PKG_VERSION"))))
        .stdout(contains("Built on"))
        .stdout(contains("applications.json"));
}
