pub mod aggregate;
pub mod attribute;
pub mod bin;
pub mod brush;
pub mod descriptor;
pub mod error;
pub mod key;
pub mod registry;
pub mod transform;
pub mod types;
