use std::process::ExitCode;

fn main() -> ExitCode {
    nitp_portal::init();
    match nitp_portal::cli::run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("nitp_portal_cli: {}", err);
            ExitCode::FAILURE
        }
    }
}
