//! # ideahub
//!
//! Client for the IdeaHub API: list, create, and like ideas, sign in with a
//! username and password, and list users.
//!
//! All data lives on the server. This crate owns only the session token
//! (`session`, persisted through `storage`) and the request pipeline that
//! attaches it to every call (`http`). `api` holds the typed endpoint calls
//! and `render` the terminal views used by the `ideahub` binary.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod render;
pub mod session;
pub mod storage;
pub mod types;

#[cfg(test)]
mod test_support;

pub use client::IdeaHubClient;
pub use config::ClientConfig;
pub use error::ClientError;
pub use session::{Session, SessionObserver, SessionState, SessionStore};
