//! Marker-based segmentation of court judgments
//!
//! The pipeline runs leaf-first:
//! 1. [`markers`]: heading vocabulary and anchored line rules
//! 2. [`locator`]: first line index of each marker
//! 3. [`templates`]: priority-ordered layout selection
//! 4. [`segmenter`]: partition of lines into sections
//! 5. [`reconstruct`]: the (lossy) inverse of segmentation
//!
//! Everything here is pure and allocation-local, so documents can be parsed
//! from any number of threads at once.

pub mod locator;
pub mod markers;
pub mod reconstruct;
pub mod result;
pub mod segmenter;
pub mod templates;

pub use markers::{CombinedLabel, LineRule, Marker, DATE_PHRASE};
pub use reconstruct::reconstruct;
pub use result::{Body, MalformedRecord, ParseError, ParseResult};
pub use segmenter::{parse, segment};
pub use templates::{select, Selection, Template};
