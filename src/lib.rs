mod classifier;
mod labels;
mod ort_classifier;
mod pages;
mod preprocess;
mod routes;
mod server;
mod storage;
mod telemetry;

pub mod app;
pub mod config;

pub use app::start_app;
