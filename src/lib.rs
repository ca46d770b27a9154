//! # verdict
//!
//! Splits court judgment texts into their structural sections (preamble,
//! operative holding, facts, reasoning, trailing metadata) by locating heading
//! markers, and rebuilds normalized texts from those sections.
//!
//! [`judgment`] holds the pure segmentation engine. [`corpus`] holds the
//! tooling around it: JSON record transforms, the directory batch runner and
//! catalog-driven marker existence checks.

pub mod corpus;
pub mod judgment;

pub use judgment::{parse, reconstruct, ParseResult};
