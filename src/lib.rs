pub mod alert;
pub mod config;
pub mod constants;
pub mod detector;
pub mod logging;
pub mod overlay;
pub mod pipeline;
pub mod ports;
pub mod services;
pub mod shutdown;

pub use eye_metrics;
