//! Request middleware: error rendering and identity extraction.

pub mod error;
pub mod identity;
