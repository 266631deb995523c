//! Request Payload Construction

use bytes::Bytes;

use super::constants::{HTTP_VERSION, LINE_ENDING};
use crate::config::RequestConfig;

/// Build the fixed request payload written to every connection.
///
/// The payload is a bare request line followed by a blank line. No
/// headers and no body are sent; the peer answers and closes on its own
/// schedule.
pub fn build_request(config: &RequestConfig) -> Bytes {
    Bytes::from(format!(
        "{} {} {}{}{}",
        config.method, config.path, HTTP_VERSION, LINE_ENDING, LINE_ENDING
    ))
}
