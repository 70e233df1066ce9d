pub mod compute;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod settings;

pub use error::{Error, Result};
