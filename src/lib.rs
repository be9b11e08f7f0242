pub mod config;
pub mod error;
pub mod rotation;
pub mod storage;

pub mod prelude {
    pub use crate::error::{Error, Result};
}
