// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod frappe_store;
pub mod memory_store;
