//! Wire Constants

/// HTTP version token written on every request line
pub const HTTP_VERSION: &str = "HTTP/1.1";

/// Line terminator for the request line and the closing blank line
pub const LINE_ENDING: &str = "\r\n";

/// Marker written to stdout once every connection has closed
pub const COMPLETION_MARKER: &str = "ok";
