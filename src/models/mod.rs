pub mod editorial;
pub mod problem;

pub use editorial::*;
pub use problem::*;
