pub mod store;
pub mod user_repo;

pub use store::{AccountStore, IdentityStore};
pub use user_repo::MongoAccountStore;
