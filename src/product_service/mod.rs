//! Product catalog operations: list, get, create, update and delete.

pub mod dtos;
pub mod error;
mod service;

pub use dtos::*;
pub use error::*;
pub use service::*;
