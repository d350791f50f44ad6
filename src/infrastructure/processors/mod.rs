// Processors module
pub mod js_processor;
pub mod linker;
pub mod minifier;
pub mod transpiler;

pub use js_processor::*;
pub use minifier::*;
