pub mod config;
pub mod constants;
pub mod error;
pub mod filter;
pub mod graph;
pub mod mapper;
pub mod primitive;
pub mod request;
pub mod selection;
pub mod stack;
pub mod view;

#[cfg(test)]
pub(crate) mod test_utils;
