pub mod config;
pub mod display;
pub mod errors;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod script;
pub mod table;
pub mod types;
