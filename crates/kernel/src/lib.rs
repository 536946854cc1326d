//! Settings, module trait, and module registry shared by every Quill crate.

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{InitCtx, Module, API_PREFIX};
pub use registry::ModuleRegistry;
