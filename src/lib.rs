//! # Warden
//!
//! `warden` is a small HTTP service that checks username/password credentials
//! and registers new accounts.
//!
//! ## Routes
//!
//! - `POST /authenticate` answers `200 Authorised` when a stored record matches
//!   both fields exactly, `401 Not Authorised` otherwise.
//! - `POST /users` creates a record and answers `201 {"id": ...}`; an existing
//!   username is a `400`.
//! - `GET|OPTIONS /health` reports build metadata and whether the user store
//!   answers a ping.
//!
//! Request bodies are validated before any store access: both `username` and
//! `password` must be present, non-empty strings and no other keys are
//! accepted.
//!
//! ## User store
//!
//! The store is selected by the DSN scheme (`memory://` or `postgres://`) and
//! every call is bounded by a timeout, see [`store`].

pub mod cli;
pub mod store;
pub mod warden;
