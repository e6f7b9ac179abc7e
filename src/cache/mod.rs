pub mod mutation;
pub mod query_cache;
pub mod query_key;

pub use mutation::Mutation;
pub use query_cache::{QueryCache, QueryState};
pub use query_key::QueryKey;
