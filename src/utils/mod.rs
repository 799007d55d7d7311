pub mod bytes;
pub mod logging;
