use std::process::ExitCode;

use trio::{cli, logger, ui};

// One thread: the divider, the workers and the synthesizer all interleave on
// the same executor
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = logger::init() {
        eprintln!("Warning: Failed to initialize logging: {e}");
    }

    match cli::main().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            ui::print_error(&format!("❌ Error in main execution: {e:#}"));
            ExitCode::FAILURE
        }
    }
}
