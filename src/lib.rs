//! Slide Renderer Library
//!
//! Renders slide plans into PPTX decks by driving Google Slides, Sheets
//! and Drive, and publishes them to Supabase Storage.
//! The HTTP server is in `src/main.rs`; `src/bin/render_job.rs` renders a
//! single job from the command line.

pub mod api;
pub mod config;
pub mod error;
pub mod renderer;
/// Shared service handles
pub mod state;
pub mod store;
