pub mod area;
pub mod measurement;
pub mod station;
