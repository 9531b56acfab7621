pub mod database;
pub mod query;
pub mod store;

pub use database::MongoDb;
pub use query::{CategoryFilter, ALL_CATEGORIES};
pub use store::{DisconnectedStore, SummaryStore};
