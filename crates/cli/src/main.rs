use anyhow::Context;
use clap::{Parser, Subcommand};
use quill_kernel::settings::Settings;

/// Quill blog post API
#[derive(Debug, Parser)]
#[command(name = "quill", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server until interrupted
    Serve,
    /// Print the resolved settings as JSON
    Settings,
    /// Print every route the server exposes
    Routes,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load Quill settings")?;

    match cli.command {
        Command::Serve => serve(settings),
        Command::Settings => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render settings")?;
            println!("{}", rendered);
            Ok(())
        }
        Command::Routes => runtime()?.block_on(print_routes(&settings)),
    }
}

async fn print_routes(settings: &Settings) -> anyhow::Result<()> {
    let registry = quill_app::build_registry(settings).await?;
    let document = quill_http::router::openapi_document(&registry);
    for (method, path) in quill_http::router::route_table(&document) {
        println!("{:<6} {}", method, path);
    }
    Ok(())
}

fn serve(settings: Settings) -> anyhow::Result<()> {
    quill_telemetry::init(&settings.telemetry)?;
    tracing::info!(env = ?settings.environment, "quill serve starting");

    runtime()?.block_on(quill_app::run(settings))
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("failed to start tokio runtime")
}
