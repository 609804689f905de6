// Entrypoint for the CLI application.
// - Keeps `main` small: load settings, then hand over to the UI flow.
// - Every outcome exits with status 0; failures are reported on the console.

use anyhow::Context;
use rle_client::{config::ApiSettings, logging, ui};

fn main() {
    logging::init_logging();

    if let Err(e) = try_main() {
        tracing::debug!(error = ?e, "run ended with an error");
        println!("Error: {e:#}");
    }
}

fn try_main() -> anyhow::Result<()> {
    // Settings are validated here, before any network activity.
    let settings = ApiSettings::load().context("configuration")?;

    let mut prompt = ui::TerminalPrompt::new();
    ui::run(&settings, &mut prompt)?;
    Ok(())
}
