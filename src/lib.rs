pub mod error;
pub mod math;
pub mod operations;
pub mod tessellation;
pub mod topology;

#[cfg(test)]
mod test_support;

pub use error::{CsgError, Result};
