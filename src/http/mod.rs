//! HTTP protocol layer module
//!
//! Range parsing, content types and response builders, independent of routing.

pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use mime::VideoKind;
pub use range::{parse_range_header, ByteRange, RangeParseResult};
pub use response::{
    build_404_response, build_405_response, build_416_response, build_500_response,
    build_moved_permanently, build_options_response, ResponseBody,
};
