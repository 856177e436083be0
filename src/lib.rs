//! Create a Request - terminal form for Request Network payment requests
//!
//! Collects the fields of a payment request, signs it with the connected
//! wallet, stores it through a request-node gateway and follows it until
//! it is confirmed on-chain.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
