// Main rules module - the extraction grammar lives in these sub-modules:
// - time_codec.rs: localized time tokens <-> seconds
// - score.rs: relative performance score
// - header_detection.rs: whole-document metadata scans
// - result_line.rs: the per-line result grammar
// - engine.rs: ExtractionEngine (one compiled family) and debug tracing

pub mod engine;
pub mod header_detection;
pub mod result_line;
pub mod score;
pub mod time_codec;

pub use engine::*;
pub use header_detection::HeaderExtractor;
pub use result_line::ResultLineParser;
pub use score::compute_score;
pub use time_codec::{format_decimal, format_percent, parse_time, parse_time_opt};
