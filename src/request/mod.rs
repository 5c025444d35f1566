//! Request building module
//!
//! Parameters, typed transport options and the builder that combines them
//! with the client state into a [`RequestConfig`].

mod builder;
mod options;
mod params;

pub use builder::RequestConfig;
pub use options::{OptionKey, OptionValue, TransportOption, TransportOptions};
pub use params::{append_query, Params};
