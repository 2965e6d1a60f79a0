//! # Video datastore
//!
//! Persistence layer for collected TikTok video rows and their
//! transcripts. The batch pipeline talks to the store exclusively
//! through the [`VideoStore`] trait. Two backends are provided: a
//! Postgres store (sqlx) and a CSV file store used when no database
//! is available.

mod datastore;
mod domain;

pub use datastore::csv::CsvVideoStore;
pub use datastore::postgres::PgVideoStore;
pub use datastore::VideoStore;
pub use domain::{Language, TranscriptSource, TranscriptUpdate, Transcripts, Video};
