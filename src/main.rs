use almanac::config::{Config, Overrides};
use almanac::render::Templates;
use almanac::serve::{self, AppState, FeedSettings};
use almanac::store::{EntryStore, SqliteStore};
use anyhow::{anyhow, Context, Result};
use clap::{crate_version, App, Arg, ArgMatches};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn app<'a, 'b>() -> App<'a, 'b> {
    App::new("almanac")
        .version(crate_version!())
        .about("Serves a personal blog from a SQLite database")
        .arg(
            Arg::with_name("config")
                .long("config")
                .takes_value(true)
                .value_name("FILE")
                .help("Project file to load (default: nearest almanac.yaml)"),
        )
        .arg(
            Arg::with_name("db-path")
                .long("db-path")
                .takes_value(true)
                .value_name("PATH")
                .help("Database file, relative to the root directory"),
        )
        .arg(
            Arg::with_name("port")
                .long("port")
                .takes_value(true)
                .help("Port to listen on, e.g. `8080` or `:8080`"),
        )
        .arg(
            Arg::with_name("root-dir")
                .long("root-dir")
                .takes_value(true)
                .value_name("DIR")
                .help("Directory the database and template paths are relative to"),
        )
        .arg(
            Arg::with_name("templates")
                .long("templates")
                .takes_value(true)
                .value_name("DIR")
                .help("Templates directory, relative to the root directory"),
        )
}

fn overrides(matches: &ArgMatches) -> Result<Overrides> {
    Ok(Overrides {
        root_directory: matches.value_of("root-dir").map(PathBuf::from),
        database: matches.value_of("db-path").map(PathBuf::from),
        templates: matches.value_of("templates").map(PathBuf::from),
        port: match matches.value_of("port") {
            Some(port) => Some(
                port.trim_start_matches(':')
                    .parse()
                    .map_err(|e| anyhow!("Invalid port `{}`: {}", port, e))?,
            ),
            None => None,
        },
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "almanac=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let matches = app().get_matches();
    let overrides = overrides(&matches)?;
    let config = match matches.value_of("config") {
        Some(path) => Config::from_project_file(Path::new(path), &overrides)?,
        None => Config::from_directory(&std::env::current_dir()?, &overrides)?,
    };
    tracing::info!(address = %config.address, database = %config.database.display(), "Loaded configuration");

    let store = SqliteStore::connect(&config.database, config.max_connections).await?;
    store.health_check().await?;
    tracing::info!("Database successfully initialized");

    let templates = Templates::load(&config.templates_directory)?;
    tracing::info!(directory = %config.templates_directory.display(), "Templates successfully initialized");

    let state = AppState::new(
        Arc::new(store),
        templates,
        FeedSettings {
            identity: config.feed.clone(),
            recent_entries: config.recent_entries,
            description_cutoff: config.description_cutoff,
        },
    );
    let app = serve::router(state, config.static_directory.as_deref());

    let listener = tokio::net::TcpListener::bind(config.address)
        .await
        .with_context(|| format!("Binding {}", config.address))?;
    tracing::info!(address = %config.address, "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
