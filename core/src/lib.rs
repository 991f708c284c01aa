//! Session and API-client core for the Cureat app.
//!
//! # Overview
//! - `BackendLocator` picks the backend base URL: explicit override, first
//!   healthy candidate, or the profile default.
//! - `HttpJsonClient` sends JSON and multipart requests through a
//!   `Transport` and classifies responses.
//! - `AuthSession` owns the logged-in/logged-out state and the persisted
//!   token.
//! - `SearchGateway` wraps the recommendation and date-course endpoints.
//!
//! # Design
//! - Requests and responses are plain data (`http` module); the network sits
//!   behind the `Transport` trait so every layer above it can be tested with
//!   a scripted transport.
//! - Nothing here retries. A failed request is reported once.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod http;
pub mod locator;
pub mod session;
pub mod storage;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::HttpJsonClient;
pub use config::{BackendConfig, Profile};
pub use error::{ApiError, CourseCreationError, SearchError, StorageError};
pub use gateway::SearchGateway;
pub use http::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, RequestBody, Transport};
pub use locator::{BackendEndpoint, BackendLocator, ResolutionSource};
pub use session::{AuthSession, Session, SessionStatus};
pub use storage::{FileStore, KeyValueStore, MemoryStore, TOKEN_KEY};
pub use types::{
    DateCourseRequest, DateCourseResult, Restaurant, SearchResult, SignupRequest, TokenResponse, UserProfile,
};
