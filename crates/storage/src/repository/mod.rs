pub mod pick;
pub mod results;
pub mod standings;
pub mod tier;
pub mod tournament;
pub mod user;
