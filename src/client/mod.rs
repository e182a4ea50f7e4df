//! Object store client module

mod object_store;

pub use object_store::{DEFAULT_PART_SIZE, ObjectStore, S3Store};
