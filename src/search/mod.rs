//! Search Module
//!
//! The search provider adapter and the result normalizer:
//! - `SearchProvider` - query in, at most ten normalized results out
//! - `SerperClient` - Serper (Google) implementation
//! - `normalize` - placeholder substitution, truncation, ordering

pub mod normalize;
pub mod provider;
pub mod serper;

pub use normalize::{normalize, organic_records};
pub use provider::{SearchError, SearchProvider};
pub use serper::SerperClient;
