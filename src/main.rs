use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use catalog_rs::auth::HttpAuthService;
use catalog_rs::config::{AppConfig, Cli, Mode};
use catalog_rs::controller::AppController;
use catalog_rs::logging;
use catalog_rs::model::{AppModel, CatalogClients, SessionStore};
use catalog_rs::seed;
use catalog_rs::view::AppView;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_cli(Cli::parse())?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = match logging::init_logging(&config.log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!(
        api = %config.api_base,
        auth = %config.auth_base,
        mode = ?config.mode,
        "=== catalog-rs starting ==="
    );

    let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
    let catalog = CatalogClients::new(http.clone(), &config.api_base);

    match config.mode {
        Mode::Seed { replace } => {
            let report = seed::seed_catalog(&catalog, replace).await?;
            println!(
                "Seeded {} artists, {} albums, {} songs (removed {})",
                report.artists, report.albums, report.songs, report.removed
            );
        }
        Mode::Shell => {
            let auth = Arc::new(HttpAuthService::new(http, &config.auth_base));
            let session = SessionStore::new(auth);
            let model = Arc::new(AppModel::new());
            let controller = AppController::new(model, session, catalog);

            if let Err(err) = run_shell(&controller).await {
                tracing::error!(error = ?err, "Application error");
                return Err(err);
            }
        }
    }

    tracing::info!("catalog-rs shutting down");
    Ok(())
}

async fn run_shell(controller: &AppController) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    render(controller).await;

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break; // EOF
        };
        controller.handle_line(&line).await;

        if controller.model().should_quit().await {
            break;
        }

        controller.model().auto_clear_old_errors().await;
        render(controller).await;
    }
    Ok(())
}

/// Print the current screen. Status messages are shown once.
async fn render(controller: &AppController) {
    let ui_state = controller.model().get_ui_state().await;
    let identity = controller.session().current_user();
    let screen = AppView::render(
        controller.router().location(),
        identity.as_ref(),
        controller.router().can_render(catalog_rs::controller::Route::Home),
        &ui_state,
    );
    println!("{screen}");
    controller.model().take_status().await;
}
