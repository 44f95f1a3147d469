pub mod edge_counting;
pub mod sampling;
