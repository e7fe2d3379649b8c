//! # gridpress
//!
//! A grid-based page layout engine driven by XML layout rules.
//!
//! A run reads a layout-rule document and an XML data document. Rules are
//! interpreted against the data tree and produce boxes (text blocks, images,
//! filled rectangles, groups) that are allocated on the cell grid of each page.
//! Named markers are recorded in an auxiliary file so a later run of the same job
//! can resolve forward references such as "see page N" or the total page count.
//!
//! - **dispatch**: the rule interpreter and its command table
//! - **document**: the page currently being filled, groups and markers
//! - **publisher**: the entry point tying a run together
//! - **output**: finished pages and where they go

// Re-export the building blocks
pub use gridpress_layout as layout;
pub use gridpress_resource as resource;
pub use gridpress_style as style;
pub use gridpress_types as types;
pub use gridpress_xpath as xpath;
pub use gridpress_xref as xref;

mod avt;
mod commands;
pub mod config;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod functions;
pub mod output;
pub mod patterns;
pub mod publisher;
pub mod rules;
pub mod sequence;
pub mod typesetter;
pub mod version;

pub use config::EngineConfig;
pub use error::{ErrorKind, PublishError};
pub use output::{CollectingSink, JsonLinesSink, PageOutput, PageSink};
pub use publisher::{Publisher, PublisherBuilder, RunOutput, RunSummary};
pub use rules::LAYOUT_NAMESPACE;
pub use sequence::Paragraph;
pub use typesetter::{FixedPitchTypesetter, TextFormat, TypesetError, Typesetter};
pub use version::{ENGINE_VERSION, check_version};
