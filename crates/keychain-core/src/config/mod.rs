//! Configuration for the keychain tool

mod loader;
mod types;

pub use loader::*;
pub use types::*;
