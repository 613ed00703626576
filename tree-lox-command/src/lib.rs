pub mod error;
pub mod interpreter;

pub use error::Error;
