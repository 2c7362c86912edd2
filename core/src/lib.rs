//! Client core for the myFlix movie API.
//!
//! # Overview
//! Registers and logs in users, browses the movie catalog, reads genre and
//! director details, and manages a user's favorites and profile. All durable
//! state lives on the server; the client keeps only a session (bearer token
//! and current user) in a local key-value store.
//!
//! # Design
//! - `MovieClient` is sans-IO: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`. It can be driven by any host.
//! - `Transport` executes requests; `UreqTransport` is the default.
//! - `SessionStore` is an explicit session context over a `KeyValueStore`
//!   and a `Notifier`, passed to whoever needs it.
//! - `MovieApi` ties the three together into async operations with session
//!   side effects.
//! - Every non-2xx status and transport failure is the same
//!   `ApiError::RequestFailed`.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod notify;
pub mod session;
pub mod transport;
pub mod types;

pub use api::MovieApi;
pub use client::MovieClient;
pub use config::ClientConfig;
pub use error::{ApiError, StoreError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use notify::{LogNotifier, Notifier, RecordingNotifier};
pub use session::{FileStore, KeyValueStore, MemoryStore, SessionStore};
pub use transport::{Transport, UreqTransport};
pub use types::{Credentials, Director, Genre, LoginResponse, Movie, MovieId, NewUser, User, UserUpdate};
