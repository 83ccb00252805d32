pub mod config;
pub mod history;
pub mod interval;
pub mod presets;
pub mod shuttles;
pub mod yoyo;
