// tsbundle - type-check a TypeScript entry file, then bundle it

pub mod cli;
pub mod config;
pub mod core;
pub mod infrastructure;
pub mod utils;
