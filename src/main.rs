//! shotline - production tracking data for VFX shows

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = shotline::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
