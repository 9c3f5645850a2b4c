pub mod error;
pub mod images;
pub mod pixels;
pub mod table;

pub use error::{Error, Result};
