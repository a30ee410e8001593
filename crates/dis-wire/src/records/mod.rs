//! Fixed-size primitive records
//!
//! Every record here has a constant wire size exposed as `WIRE_SIZE`.

pub mod appearance;
pub mod capabilities;
pub mod dead_reckoning;
pub mod entity_type;
pub mod ids;
pub mod marking;
pub mod vector;

pub use appearance::*;
pub use capabilities::*;
pub use dead_reckoning::*;
pub use entity_type::*;
pub use marking::*;
pub use vector::*;
