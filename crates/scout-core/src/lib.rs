//! Core types and trait definitions for the scout catalogue.
//!
//! This crate has no HTTP or database dependencies. It owns
//! the domain model, the authorization gate, live collection mirrors, the
//! identity resolver and the mutation façade. Storage backends implement
//! [`store::DocumentStore`]; surfaces (`scout-api`, `scout-cli`) drive the
//! façade.

pub mod busy;
pub mod comment;
pub mod error;
pub mod gate;
pub mod identity;
pub mod mirror;
pub mod mutations;
pub mod player;
pub mod principal;
pub mod store;
pub mod views;

pub use error::{Denial, Error, Invalid, Result};
