pub mod document;
pub mod text;

pub use document::{OutputDocument, PdfDocument};
