pub mod handlers;
pub mod server;
pub mod state;

pub use handlers::ApiError;
pub use server::ApiServer;
pub use state::{AppState, ServiceKind};
