/// Print records and the repository coordinating their storage
///
/// A print is one uploaded file (image or PDF) plus its ownership and
/// category tags. The repository owns the two-phase write behind an
/// upload: file bytes into the blob backend, then the metadata row.

pub mod models;
pub mod store;

pub use models::*;
pub use store::PrintStore;
