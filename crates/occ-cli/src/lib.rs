pub mod commands;
pub mod import;
pub mod jpdb;
pub mod logging;
pub mod render;
