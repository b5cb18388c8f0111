pub mod checkpoint;
pub mod evaluation;
pub mod generation;
pub mod induction;
pub mod pruning;
pub mod tree;
