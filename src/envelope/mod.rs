// src/envelope/mod.rs

//! The structured result envelope emitted by data collectors.
//!
//! - [`model`] defines the JSON schema a collector must print to stdout
//!   ([`model::CrawlResult`]) and the process provenance attached to it.
//! - [`decode`] parses an execute stage's stdout into that schema and
//!   stamps it with the pipeline's own process metadata.

pub mod decode;
pub mod model;

pub use decode::decode_crawl_result;
pub use model::{CrawlResult, Crawler, Employee, ProcInfo};
