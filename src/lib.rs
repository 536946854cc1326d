//! Quill application library
//!
//! Wires the posts module onto the shared kernel, storage, and HTTP crates.

use anyhow::Context;
use quill_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub mod modules;

/// Registry with every module registered against the configured store
pub async fn build_registry(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let store = quill_db::connect(&settings.database)
        .await
        .context("failed to open post store")?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store)?;
    Ok(registry)
}

/// Run the service until shutdown: init, start, serve, then stop modules
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry(&settings).await?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = quill_http::start_server(&registry, &settings).await;

    registry.stop_all().await?;
    served
}
