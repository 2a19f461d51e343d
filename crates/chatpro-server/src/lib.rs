//! ChatPro companion service: the HTTP API over page snapshots plus the
//! command-line export tools.

pub mod cli;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
