//! REST client plumbing.
//!
//! ARCHITECTURE
//! ============
//! `http` is the one place requests are built and responses classified;
//! `api` groups named operations on top of it; `types` holds wire schemas;
//! `error` is the taxonomy every call reports through.

pub mod api;
pub mod error;
pub mod http;
pub mod types;
