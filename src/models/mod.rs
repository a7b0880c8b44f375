pub mod forecast;
pub mod thresholds;
pub mod verdict;

pub use forecast::*;
pub use thresholds::*;
pub use verdict::*;
