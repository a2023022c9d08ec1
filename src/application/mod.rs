// Application layer - aggregation pipeline over the record store trait
pub mod aggregate;
pub mod dashboard_service;
pub mod expiry_checker;
pub mod field_resolver;
pub mod health;
pub mod record_fetcher;
pub mod record_store;
