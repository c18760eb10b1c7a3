// src/infrastructure/mod.rs
pub mod config;
pub mod editor;
pub mod http;
pub mod session;

pub use config::Config;
pub use editor::ExternalEditor;
pub use http::HttpApi;
pub use session::FileSessionStore;
