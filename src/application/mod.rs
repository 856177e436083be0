//! Application layer managing state and the submission workflow.
//!
//! This module coordinates between the domain layer and presentation layer:
//! the form input model, the workflow state machine, the submission
//! controller and the seams to the wallet and invoicing client.

pub mod errors;
pub mod form;
pub mod ports;
pub mod state;
pub mod submission;
pub mod workflow;

pub use errors::*;
pub use form::*;
pub use ports::*;
pub use state::*;
pub use submission::*;
pub use workflow::*;
