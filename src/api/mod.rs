//! HTTP surface of the worker

pub mod crawl;
pub mod error;
pub mod health;
pub mod openapi;
pub mod scan;

pub use error::ApiError;
