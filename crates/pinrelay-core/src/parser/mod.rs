//! Parsers for upstream responses

pub mod search;

pub use search::parse_search_response;
