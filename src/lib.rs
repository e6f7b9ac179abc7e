//! Client for the task manager API.
//!
//! Layers, leaves first: [`platform`] (storage, navigation, notifications),
//! [`http`] (authenticated JSON transport), resource services in [`task`]
//! and [`auth`], the query cache in [`cache`], the client state [`store`],
//! and view models in [`view`]. [`state::AppState`] wires them together.

pub mod auth;
pub mod cache;
pub mod error;
pub mod http;
pub mod platform;
pub mod state;
pub mod store;
pub mod task;
pub mod view;

pub use error::{ClientError, Result};
pub use state::{AppState, Config};
