pub mod api;
pub mod args;
pub mod backup;
pub mod commands;
mod config;
mod error;
pub mod model;
pub mod notify;
pub mod repo;
pub mod settings;
pub mod store;
mod utils;
pub mod validate;


pub use api::Mode;
pub use config::Config;
pub use error::Error;
pub use error::ErrorType;
pub use error::Result;
