//! Business logic services.

#![allow(missing_docs)]

pub mod feed;
pub mod page;
pub mod poll;
pub mod status;
pub mod update;
pub mod user;

pub use feed::{FeedItem, FeedPage, FeedService, merge_feed};
pub use page::{ITEMS_PER_PAGE, PageRequest};
pub use poll::{CreatePollInput, PollPage, PollService, PollView};
pub use status::{BoardEntry, StatusService};
pub use update::{UpdatePage, UpdateService, UpdateWithAuthor};
pub use user::{LoginInput, RegisterInput, Session, UserProfile, UserService};
