//! Async Rust client library for the Qualys Asset Management (QPS REST 2.0) API.
//!
//! Provides Basic-auth XML transport, a typed request/response envelope
//! codec with SUCCESS/count validation, and the asset and tag operations
//! used to clean hosts out of a vulnerability-management inventory.
//!
//! # Modules
//!
//! - [`auth`] — Basic-auth credential pair and header computation.
//! - [`client`] — Authenticated HTTP transport for the QPS REST API.
//! - [`config`] — Config file loading and flag/env/file resolution.
//! - [`envelope`] — `ServiceRequest`/`ServiceResponse` XML codec.
//! - [`error`] — Typed error hierarchy (`QualysError`).
//! - [`hostassets`] — Deactivate, uninstall, clean, and host search.
//! - [`tags`] — Tag search, creation, and attachment to assets.
//! - [`validate`] — Response code and count validation.
//!
//! # Quick Start
//!
//! ```ignore
//! use qualys_am::auth::Credentials;
//! use qualys_am::client::QualysClient;
//! use qualys_am::hostassets;
//!
//! let client = QualysClient::new(Credentials::new("user", "password"));
//! hostassets::clean_by_id(&client, "12345").await?;
//! ```

#![warn(missing_docs)]

pub mod auth;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod hostassets;
pub mod tags;
pub mod validate;
