//! Client-side session state.
//!
//! ARCHITECTURE
//! ============
//! `session` owns the authoritative session and its lifecycle; `storage`
//! persists the token between runs.

pub mod session;
pub mod storage;
