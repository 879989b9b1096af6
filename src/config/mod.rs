pub mod env;
pub mod server;

pub use env::EnvConfig;
pub use server::{ServerConfig, DEFAULT_API_BASE, IMAGE_MODEL, SERVER_NAME};
