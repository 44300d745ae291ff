//! Safe SQL builder: identifiers from table metadata only, values as parameters.

mod builder;
pub mod params;
mod table;
pub use builder::*;
pub use params::*;
pub use table::*;
