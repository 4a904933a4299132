/// Simulation: the maze model, the running session, and the motion feed.

pub mod controller;
pub mod event;
pub mod maze;
pub mod sampler;
pub mod session;
