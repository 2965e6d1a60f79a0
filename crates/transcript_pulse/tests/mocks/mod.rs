pub mod audio;
pub mod captions;
pub mod datastore;
pub mod fetcher;
pub mod resolver;
pub mod speech;
