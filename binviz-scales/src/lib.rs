pub mod bin_range;
pub mod color;
pub mod error;
pub mod linear;
pub mod nice;
pub mod selector;
pub mod temporal;
