pub mod admit_cards;
pub mod auth;
pub mod dashboard;
pub mod maintenance;
pub mod otp;
pub mod roll_numbers;
pub mod settings;
pub mod students;
