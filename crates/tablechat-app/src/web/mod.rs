// Web frontend module
pub mod protocol;
pub mod render;
pub mod routes;
pub mod server;
pub mod session_manager;

pub use protocol::{Notice, SessionInfo};
pub use routes::{create_router, AppState};
pub use server::{WebServer, WebServerConfig};
pub use session_manager::{Session, SessionError, SessionId, SessionManager};
