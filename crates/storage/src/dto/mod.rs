pub mod picks;
pub mod results;
pub mod season;
pub mod tiers;
