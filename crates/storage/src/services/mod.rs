pub mod picks;
pub mod scoring;
pub mod season;
pub mod tiers;
