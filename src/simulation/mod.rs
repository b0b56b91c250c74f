pub mod states;
pub mod region;
pub mod params;
pub mod quadtree;
pub mod collision;
pub mod integrator;
pub mod generator;
pub mod engine;
pub mod scenario;
