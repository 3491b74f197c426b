//! # famiprint: family print archive core
//!
//! `famiprint` is the data-access core of a family photo and print
//! archive: uploads go to a pluggable blob store (disk or S3) with the
//! metadata row in SQLite, categories resolve by name on the fly, and a
//! feed keeps an in-memory view of the archive for a UI to render.
//!
//! ## Quick Start
//!
//! ```no_run
//! use famiprint::{ArchiveConfig, ArchiveContext, UploadFile};
//!
//! # #[tokio::main]
//! # async fn main() -> famiprint::ArchiveResult<()> {
//! let config = ArchiveConfig::from_env()?;
//! let ctx = ArchiveContext::new(config).await?;
//!
//! // Upload a print, filing it under a category by name
//! let file = UploadFile::new(
//!     "beach.jpg".to_string(),
//!     "image/jpeg".to_string(),
//!     std::fs::read("beach.jpg")?,
//! );
//! let print = ctx.prints.upload(file, Some("Mom"), Some("Summer Trip")).await?;
//! println!("uploaded to {}", print.url);
//!
//! // A feed scoped to one family member
//! let feed = ctx.feed(Some("Mom".to_string()));
//! feed.load().await;
//! for print in feed.snapshot().await.prints {
//!     println!("{} ({})", print.filename, print.category_name.unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐
//! │  PrintFeed   │  ← in-memory view state for a UI
//! ├──────────────┤
//! │  PrintStore  │  ← upload orchestration: blob first, then row,
//! │CategoryStore │    with a compensating delete between the two
//! ├──────────────┤
//! │ BlobBackend  │  ← disk / S3 / memory object storage
//! │    SQLite    │  ← print and category rows
//! └──────────────┘
//! ```
//!
//! Uploads are validated (`image/*` or `application/pdf`, 10 MiB cap)
//! before any I/O. A print row never exists without its blob: when the
//! row insert fails after the blob landed, the blob is deleted again
//! and the insert error is surfaced as [`ArchiveError::MetadataSave`].

pub mod blob_store;
pub mod categories;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod feed;
pub mod prints;

// Re-export main types for clean API
pub use blob_store::{BlobBackend, DiskBlobBackend, MemoryBlobBackend, S3BlobBackend};
pub use categories::{Category, CategoryStore};
pub use config::{ArchiveConfig, BlobstoreConfig};
pub use context::ArchiveContext;
pub use error::{ArchiveError, ArchiveResult};
pub use feed::{FeedState, PrintFeed};
pub use prints::{Print, PrintMetadata, PrintStore, UploadFile, MAX_UPLOAD_BYTES};
