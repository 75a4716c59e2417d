pub mod batch;
pub mod cigar_parser;
pub mod error;
pub mod hts_reader;
pub mod md_parser;
pub mod reference;
pub mod report;
pub mod sam_parser;
pub mod triplets;

pub use error::{Error, Result};
