//! Blob store adapters.

mod memory;
mod s3;

pub use memory::MemoryBlobStore;
pub use s3::S3BlobStore;
