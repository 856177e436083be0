//! Presentation layer handling terminal UI and user input.
//!
//! This module manages the terminal user interface using ratatui,
//! maps key presses onto application actions, and renders the request
//! form, the workflow status and the request data.

pub mod ui;
pub mod input;

pub use ui::*;
pub use input::*;
