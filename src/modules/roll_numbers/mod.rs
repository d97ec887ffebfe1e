pub mod controller;
pub mod planner;
pub mod router;
pub mod service;

pub use router::init_roll_numbers_router;
