//! Folio Net — blocking HTTP implementations of the importer's
//! collaborator traits: the cover store and the archive metadata
//! write-back.

pub mod archive;
pub mod covers;

pub use archive::ArchiveItemClient;
pub use covers::CoverstoreClient;
