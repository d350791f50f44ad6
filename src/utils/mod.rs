// Shared utilities module
pub mod errors;
pub mod logging;
pub mod source_maps;
pub mod ui;

pub use errors::*;
pub use logging::*;
