pub mod error;
pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use error::{SimError, SimResult};

pub use simulation::states::{Body, System, NVec2};
pub use simulation::region::{BoundingRegion, overlaps};
pub use simulation::params::Parameters;
pub use simulation::quadtree::{SpatialIndex, QuadNode};
pub use simulation::collision::{CandidateGroup, candidate_groups, collide, find_intersections};
pub use simulation::integrator::integrate_tick;
pub use simulation::engine::{rebuild_index, resolve_collisions, step, TickReport};
pub use simulation::generator::generate_bodies;
pub use simulation::scenario::Scenario;

pub use configuration::config::{ScenarioConfig, WorldConfig, ParametersConfig, GeneratorConfig, BodyConfig};

pub use benchmark::benchmark::{bench_broad_phase, bench_tick_curve};
