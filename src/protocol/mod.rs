//! Request Protocol
//!
//! The fixed HTTP/1.1 request written to every outbound connection.

pub mod constants;
pub mod request;

pub use constants::*;
pub use request::build_request;
