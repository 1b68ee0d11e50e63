pub mod aggregate;
pub mod ai;
pub mod application;
pub mod chart;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod menu;
pub mod money;
pub mod record;
pub mod report;
pub mod social;
pub mod trend;
pub mod week;
