pub mod api;
pub mod api_doc;
pub mod error;
pub mod server;

pub use server::{run_server, AppState};
