mod archive;
mod media_store;

pub use archive::{ArchiveError, ZipSink};
pub use media_store::{MediaStore, StoredFile};
