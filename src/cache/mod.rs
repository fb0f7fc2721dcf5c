//! Cache Module
//!
//! The typed cache facade: native values in, native values out, stored
//! with the matching Redis-style representation.

mod codec;
mod namespace;
mod typed;
mod value;


// Re-export public types
pub use codec::{decode, encode};
pub use namespace::{make_ns_key, Namespace};
pub use typed::{GetOptions, Removed, SetOpOutcome, TypedCache, ZRange, DEFAULT_RESULT_TTL};
pub use value::{CacheValue, Scalar, ShapeHint};
