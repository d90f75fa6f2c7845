//! Parsers for EDGAR documents: full submission text, 13F reports and index files.

pub mod filing;
pub mod index;
pub mod thirteenf;
