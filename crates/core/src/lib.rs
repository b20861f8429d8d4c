//! Core library: file enumeration, encoding detection and conversion, zlib inflation,
//! and ID3 tag normalisation.

pub mod audit;
pub mod backup;
pub mod config;
pub mod convert;
pub mod decision;
pub mod deflate;
pub mod detector;
pub mod encoding;
pub mod error;
pub mod mp3tag;
pub mod pipeline;
pub mod runlog;
pub mod scanner;
