use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use recipes::app::{Outcome, Presenter};
use recipes::cli::Cli;
use recipes::dispatch::EventDispatcher;
use recipes::document::DocumentTheme;
use recipes::error::RunError;
use recipes::runtime::Runtime;
use recipes_transport::payload::operation_subscription;
use recipes_transport::{SubscriptionHandle, TransportClient};
use recipes_tui::config::EnvConfig;
use recipes_tui::logging::init_file_logging;
use recipes_tui::platform::{install_panic_hook, install_signal_handlers};
use recipes_tui::{prewarm_highlighting, ProcessTerminal};
use tokio::sync::mpsc;
use tracing::{error, info};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let env = EnvConfig::from_env();
    if let Err(err) = init_file_logging(&env) {
        eprintln!("gatsby-recipes: logging disabled: {err}");
    }

    if !env.no_highlight {
        let _ = std::thread::Builder::new()
            .name("highlight-prewarm".to_string())
            .spawn(prewarm_highlighting);
    }

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(RunError::Runtime)
            .and_then(|runtime| runtime.block_on(run(cli, env)))
    }));

    match result {
        Ok(Ok(outcome)) => {
            info!(?outcome, "exiting");
            ExitCode::from(outcome.exit_code())
        }
        Ok(Err(err)) => {
            error!(%err, "run failed");
            eprintln!("gatsby-recipes: {err}");
            ExitCode::from(1)
        }
        // the panic hook has already restored the terminal and printed the message
        Err(_) => {
            error!("run panicked");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli, env: EnvConfig) -> Result<Outcome, RunError> {
    let config = cli.transport_config();
    let client = TransportClient::new(config.clone())?;
    let dispatcher = EventDispatcher::new(Arc::new(client));
    let presenter = Presenter::new(cli.presenter_options(
        cli.resolve_project_root().map_err(RunError::ProjectRoot)?,
    ));
    info!(recipe = ?presenter.recipe(), endpoint = %config.http_url(), "starting recipe client");

    let terminal = ProcessTerminal::new();
    let restore = terminal.restore_handle();
    install_panic_hook(move || restore.restore());

    let (signal_tx, signal_rx) = mpsc::unbounded_channel();
    let _signals = install_signal_handlers(move |signal| {
        let _ = signal_tx.send(signal);
    })
    .map_err(RunError::Signals)?;

    let (subscription, events) = SubscriptionHandle::spawn(config, operation_subscription());
    let theme = DocumentTheme::terminal(!env.no_highlight);
    Runtime::new(terminal, presenter, dispatcher, theme)
        .run(events, signal_rx, Some(subscription))
        .await
}
