//! SQL generation for the Postgres store: identifiers from model metadata only, values as parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
