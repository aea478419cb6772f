pub mod in_flight;
pub mod metrics;
pub mod session_store;
