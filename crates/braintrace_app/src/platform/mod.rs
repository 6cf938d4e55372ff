mod app;
mod commands;
mod config;
mod effects;
mod graph_view;
mod logging;
mod persistence;
mod render;

pub use app::run_app;
