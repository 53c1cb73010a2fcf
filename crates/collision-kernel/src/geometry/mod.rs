pub mod pose;
pub mod segment;
