pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod settings;

mod app_context;

pub use app_context::AppContext;
pub use settings::{Settings, SettingsError};
