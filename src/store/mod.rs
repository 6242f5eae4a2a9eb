//! Job and blob storage
//!
//! Traits the pipeline and the HTTP layer depend on, plus the in-memory
//! and Supabase implementations.

pub mod blob;
pub mod error;
pub mod job;
pub mod memory;
pub mod supabase;

pub use blob::BlobStore;
pub use error::StoreError;
pub use job::{ClaimOutcome, JobRecord, JobStatus, JobStore, JobUpdate};
pub use memory::{MemoryBlobStore, MemoryJobStore, StoredBlob};
pub use supabase::SupabaseClient;
