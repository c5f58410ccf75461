//! Reportdesk client core.
//!
//! SYSTEM CONTEXT
//! ==============
//! Client for the Reportdesk business-reporting API: a session store that
//! owns the bearer token and user profile, a REST binding that signs
//! requests from that session, and a router whose guard keeps anonymous
//! users out of protected views.
//!
//! The session store is the single writer; everything else observes it.

pub mod config;
pub mod net;
pub mod router;
pub mod state;

#[cfg(test)]
#[path = "mock_api_test.rs"]
pub(crate) mod test_helpers;
