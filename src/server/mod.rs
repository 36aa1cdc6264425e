pub mod config;
pub mod handler;
pub mod server;
pub mod store;

pub use config::ServerConfig;
pub use handler::ConnectionHandler;
pub use server::ArcadeServer;
pub use store::ResultStore;
