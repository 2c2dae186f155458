//! Infrastructure Layer
//!
//! Database and filesystem implementations of the domain traits.

pub mod postgres;
pub mod uploads;

pub use postgres::PgArticleRepository;
pub use uploads::DiskUploadStore;
