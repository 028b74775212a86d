//! Application layer containing lookup logic and shared state.

pub mod service;
pub mod state;

pub use service::LookupService;
pub use state::AppState;
