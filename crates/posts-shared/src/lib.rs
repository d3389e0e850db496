//! # Posts Shared
//!
//! Request/response types shared between the posts API and its clients.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
