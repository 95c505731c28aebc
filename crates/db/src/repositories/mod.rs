//! Database repositories.

mod poll;
mod status;
mod update;
mod user;

pub use poll::{PollOptionRepository, PollRepository, PollVoteRepository};
pub use status::StatusRepository;
pub use update::UpdateRepository;
pub use user::UserRepository;
