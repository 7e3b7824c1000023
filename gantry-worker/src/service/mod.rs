//! Service layer
//!
//! The worker's injected collaborators live behind traits here: the job
//! contract the Master's payloads are turned into, and the blob store the
//! crash-log path uploads to. Default implementations (process-backed
//! jobs, filesystem blob store) make the binary a complete program.

mod blob;
mod job;
mod process;

// Re-export traits
pub use blob::{BlobStore, ByteStream};
pub use job::{Job, JobFactory};

// Re-export implementations
pub use blob::FsBlobStore;
pub use process::{ProcessJob, ProcessJobFactory};
