//! Core data layer: message records, archive access, user directory.

pub mod archive;
pub mod directory;
pub mod message;

pub use archive::{ArchiveError, MessageArchive};
pub use directory::{ArchiveDirectory, NullDirectory, UserDirectory};
pub use message::Message;
