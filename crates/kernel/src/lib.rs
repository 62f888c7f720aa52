//! Core traits, settings and the module registry shared by every Atrium crate.

pub mod module;
pub mod registry;
pub mod settings;

pub use atrium_db::Migration;
pub use module::{InitCtx, Module};
pub use registry::ModuleRegistry;
