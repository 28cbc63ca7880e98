pub mod config;
pub mod error;
pub mod types;

pub use error::{WicredError, WicredResult};
pub use types::{Credentials, TransportFields};
