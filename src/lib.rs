pub mod app;
pub mod audio;
pub mod config;
pub mod core;
pub mod library;
pub mod logging;
pub mod model;
pub mod player;
pub mod ui;
pub mod worker;
