pub mod coordinator;
pub mod handler;

pub use coordinator::{Coordinator, DEFAULT_MAX_SESSIONS, SessionGuard};
pub use handler::{SessionContext, serve};
