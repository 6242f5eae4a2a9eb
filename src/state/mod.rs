//! Application state
//!
//! Service handles built once at startup and shared read-only by every
//! request and background job.

pub mod app_state;

pub use app_state::AppState;
