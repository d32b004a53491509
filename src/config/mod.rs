//! Configuration loader and schema types.
//!
//! Settings come from an optional TOML file, overridden by `TUNEPEEK__` prefixed
//! environment variables, with struct defaults for everything left unset.

mod load;
mod schema;

pub use schema::*;
