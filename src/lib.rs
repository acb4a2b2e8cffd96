pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod poller;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod source;
pub mod timeparse;

pub use config::Config;
pub use error::{AppError, Result};
