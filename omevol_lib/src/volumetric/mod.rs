//! Multi-channel volumes and OME-TIFF input/output

mod channel;
mod image;
mod ome_tiff;
pub mod ome_xml;

pub use channel::{lut_lookup, Channel, DEFAULT_PERCENTILES, LUT_SIZE};
pub use image::ImageXYZC;
pub use ome_tiff::{load_ome_tiff, write_ome_tiff};
pub use ome_xml::OmeMetadata;

#[derive(thiserror::Error, Debug)]
pub enum VolumeError {
    #[error("cannot read volume file: {0}")]
    Io(#[from] std::io::Error),
    #[error("tiff error: {0}")]
    Tiff(#[from] tiff::TiffError),
    #[error("invalid OME-XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("OME-XML has no <{0}> element")]
    MissingElement(&'static str),
    #[error("OME-XML attribute {0} is missing")]
    MissingAttribute(&'static str),
    #[error("OME-XML attribute {name} has invalid value '{value}'")]
    InvalidAttribute { name: &'static str, value: String },
    #[error("unsupported pixel type {0}")]
    UnsupportedPixelType(String),
    #[error("expected {expected} pages, file has {found}")]
    PageCount { expected: usize, found: usize },
    #[error("page {page} is {found:?}, expected {expected:?}")]
    PageSize {
        page: usize,
        expected: (u32, u32),
        found: (u32, u32),
    },
    #[error("expected {expected} samples, got {found}")]
    DataLength { expected: usize, found: usize },
    #[error("bad volume layout: {0}")]
    Layout(String),
}
