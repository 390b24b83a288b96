// Entrypoint for the CLI application.
// - Keeps `main` small: set up logging, create an API client for the
//   resolved backend address and hand it to the UI loop.
// - Backend failures are shown in the menu; only terminal I/O errors end
//   the process.

use anyhow::Context;
use rag_study_cli::{api::ApiClient, ui::main_menu};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with the menu on stdout.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rag_study_cli=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Create API client configured by environment variable `BACKEND_URL`
    // or the compiled-in default. The address is read once, here.
    let api = ApiClient::from_env().context("Failed to create API client")?;
    tracing::info!(backend = %api.address(), "starting");

    // Start the interactive menu. This call blocks until the user exits.
    main_menu(api)?;
    Ok(())
}
