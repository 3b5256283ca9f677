pub mod audit;
pub mod delivery;
pub mod markup;
pub mod submission;
