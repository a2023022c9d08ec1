// Domain layer - pure value types, no I/O
pub mod chart;
pub mod customer;
pub mod dashboard;
pub mod record;
