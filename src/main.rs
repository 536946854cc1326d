use anyhow::Context;
use quill_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load Quill settings")?;
    quill_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "quill-app bootstrap starting"
    );

    quill_app::run(settings).await
}
