pub mod admin;
pub mod season;
pub mod tournaments;
