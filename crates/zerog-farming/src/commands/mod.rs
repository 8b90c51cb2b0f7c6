mod build;
mod generate;

pub use build::*;
pub use generate::*;
