// Infrastructure layer
pub mod file_system;
pub mod module_resolver;
pub mod processors;
pub mod type_checker;

pub use file_system::*;
pub use module_resolver::*;
pub use processors::*;
pub use type_checker::*;
