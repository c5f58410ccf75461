//! Client-side routing.
//!
//! ARCHITECTURE
//! ============
//! `table` declares the routes and matches paths, `guard` decides whether a
//! session may enter a route, and `navigator` applies the guard to every
//! transition and tracks the current location.

pub mod guard;
pub mod navigator;
pub mod table;
