pub mod posts;

use std::sync::Arc;

use quill_db::PostStore;
use quill_kernel::ModuleRegistry;

/// Register all project modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, store: Arc<dyn PostStore>) -> anyhow::Result<()> {
    registry.register(posts::create_module(store)?);
    Ok(())
}
