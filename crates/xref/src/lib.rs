//! Named markers with page numbers, persisted between runs so that forward
//! references resolve on the next run.
use thiserror::Error;

pub mod aux;
pub mod tracker;

pub use aux::{AuxData, aux_path, parse_aux, read_aux, to_xml, write_aux};
pub use tracker::{Marker, ReferenceTracker};

#[derive(Error, Debug)]
pub enum XrefError {
    #[error("I/O error on aux file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed aux file: {0}")]
    Parse(#[from] quick_xml::de::DeError),

    #[error("Could not serialize aux data: {0}")]
    Serialize(#[from] quick_xml::se::SeError),
}
