pub mod charts;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod filter;
pub mod insights;
pub mod layout;
pub mod logging;
pub mod server;
pub mod summary;
