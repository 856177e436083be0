pub mod models;
pub mod reference;
pub mod units;
pub mod errors;

pub use models::*;
pub use reference::*;
pub use units::*;
pub use errors::*;
