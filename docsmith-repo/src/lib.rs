//! Docsmith Repository - Repository access module
//!
//! Responsible for validating repository roots, walking them for eligible
//! files and cloning remote repositories to a local directory

pub mod filter;
pub mod processor;
pub mod walker;

pub use filter::*;
pub use processor::*;
pub use walker::*;
