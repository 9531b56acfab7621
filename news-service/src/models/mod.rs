pub mod summary;

pub use summary::{Summary, SUMMARY_FIELDS};
