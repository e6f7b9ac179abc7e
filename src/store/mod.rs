pub mod client_store;
pub mod store_actions;
pub mod store_reducer;
pub mod store_state;

pub use client_store::Store;
pub use store_actions::{Action, Phase};
pub use store_reducer::reduce;
pub use store_state::{AsyncKind, Pagination, StoreState};
