pub mod controller;
pub mod router;
pub mod service;

pub use router::{init_public_settings_router, init_settings_router};
