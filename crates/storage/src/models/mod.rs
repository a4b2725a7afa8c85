mod pick;
mod pick_result;
mod standing;
mod tier;
mod tournament;
mod user;

pub use pick::Pick;
pub use pick_result::{PickResult, TournamentScore};
pub use standing::{MISSED_CUT_STATUS, PlayerStanding};
pub use tier::TierAssignment;
pub use tournament::Tournament;
pub use user::User;
