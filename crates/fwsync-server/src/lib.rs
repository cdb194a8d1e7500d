pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod scheduler;
pub mod server;

pub use observability::{apply_logging_level, init_tracing};
pub use server::{AppState, FwsyncServer, ServerBuilder, build_app};
