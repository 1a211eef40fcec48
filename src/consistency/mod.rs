pub mod evaluator;
pub mod ranges;
pub mod types;

pub use evaluator::{evaluate, ConsistencyEvaluator};
pub use ranges::{IdealRange, IdealRanges, Parameter};
pub use types::{ConsistencyMap, ConsistencyReport};
