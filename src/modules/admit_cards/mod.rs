//! Admit card rendering and the bulk generate/send workflow.

pub mod controller;
pub mod renderer;
pub mod router;
pub mod service;

pub use router::init_admit_cards_router;
