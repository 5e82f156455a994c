pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod state;
pub mod ws;

pub use config::Config;
pub use error::{AppError, Result};
pub use registry::RoomRegistry;
pub use state::AppState;
