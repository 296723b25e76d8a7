pub mod error;

pub use error::{PromexError, Result};
