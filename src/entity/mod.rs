//! SeaORM entity definitions.

pub mod analysis;
pub mod image;
pub mod vehicle;
