//! Tooling around the segmentation engine
//!
//! - [`record`]: JSON judgment records in and out
//! - [`batch`] and [`shard`]: parallel directory processing
//! - [`catalog`] and [`survey`]: catalog-driven marker existence checks
//! - [`prefilter`] and [`sample`]: picking raw records to work on

pub mod batch;
pub mod catalog;
pub mod prefilter;
pub mod record;
pub mod sample;
pub mod shard;
pub mod survey;

pub use batch::{BatchError, BatchOptions, BatchRunner, BatchStats};
pub use catalog::{CatalogError, DocumentSearch, FlagCatalog, FlagChecker, FlagReport};
pub use prefilter::{prefilter_dir, PrefilterRules, PrefilterStats};
pub use record::{reconstruct_value, transform_record, RecordError, RecordOptions};
pub use sample::{sample_files, SampleReport, SampledFile};
pub use shard::shard;
pub use survey::{filter_dir, survey_dir, FilterStats, SurveyReport};
