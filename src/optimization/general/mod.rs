//! Problem-independent optimization machinery.

mod cache;
mod controller;
mod error;
mod function;
mod optimizer;
mod point;

pub use cache::{AbortOutcome, FunctionCache, ParallelExecutorCache};
pub use controller::{DefaultOptimizationController, OptimizationController};
pub use error::{OptimizationError, Result};
pub use function::Function;
pub use optimizer::{FunctionOptimizer, MultidirectionalSearchOptimizer, SearchStatistics};
pub use point::Point;
