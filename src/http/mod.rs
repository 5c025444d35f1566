//! HTTP protocol types
//!
//! Method representation and how each method is handed to a transport.

mod method;

pub use method::*;
