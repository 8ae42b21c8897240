mod app;
pub(crate) mod cli;
mod effects;
mod logging;
mod persistence;

pub(crate) use app::run_app;
