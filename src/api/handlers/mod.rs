//! API handlers for the cards service.
//!
//! `cards` holds the CRUD routes, `country` the allow-list middleware guarding
//! them, and `health`/`root` the ungated service endpoints.

pub mod cards;
pub mod country;
pub mod health;
pub mod root;
