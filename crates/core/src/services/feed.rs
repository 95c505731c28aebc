//! Combined feed of updates and polls.
//!
//! Both sources are paged independently with the same page number and the
//! two slices are merged, so a feed page holds up to twice
//! [`ITEMS_PER_PAGE`](super::page::ITEMS_PER_PAGE) items and page boundaries
//! are approximate: an item from one source can appear on a later page than
//! an older item from the other source.

use std::cmp::Ordering;

use founders_common::AppResult;
use sea_orm::prelude::DateTimeWithTimeZone;

use super::page::PageRequest;
use super::poll::{PollPage, PollService, PollView};
use super::update::{UpdatePage, UpdateService, UpdateWithAuthor};

/// An entry of the combined feed.
#[derive(Debug, Clone)]
pub enum FeedItem {
    Update(UpdateWithAuthor),
    Poll(PollView),
}

impl FeedItem {
    /// When the item was posted.
    #[must_use]
    pub const fn created_at(&self) -> &DateTimeWithTimeZone {
        match self {
            Self::Update(u) => &u.update.created_at,
            Self::Poll(p) => &p.poll.created_at,
        }
    }

    /// The item's ID.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Update(u) => &u.update.id,
            Self::Poll(p) => &p.poll.id,
        }
    }

    const fn kind_rank(&self) -> u8 {
        match self {
            Self::Update(_) => 0,
            Self::Poll(_) => 1,
        }
    }
}

/// One page of the combined feed.
#[derive(Debug, Clone, Default)]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    pub has_more: bool,
}

/// Merge one page of updates and one page of polls.
///
/// Items are ordered newest first; on equal timestamps updates come before
/// polls, then higher IDs first. `has_more` is set when either source has
/// another page.
#[must_use]
pub fn merge_feed(updates: UpdatePage, polls: PollPage) -> FeedPage {
    let has_more = updates.has_more || polls.has_more;

    let mut items: Vec<FeedItem> = updates
        .updates
        .into_iter()
        .map(FeedItem::Update)
        .chain(polls.polls.into_iter().map(FeedItem::Poll))
        .collect();
    items.sort_by(compare_newest_first);

    FeedPage { items, has_more }
}

fn compare_newest_first(a: &FeedItem, b: &FeedItem) -> Ordering {
    b.created_at()
        .cmp(a.created_at())
        .then_with(|| a.kind_rank().cmp(&b.kind_rank()))
        .then_with(|| b.id().cmp(a.id()))
}

/// Feed service.
#[derive(Clone)]
pub struct FeedService {
    update_service: UpdateService,
    poll_service: PollService,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub const fn new(update_service: UpdateService, poll_service: PollService) -> Self {
        Self {
            update_service,
            poll_service,
        }
    }

    /// One page of the combined feed.
    pub async fn page(&self, page: PageRequest) -> AppResult<FeedPage> {
        let updates = self.update_service.list(page).await?;
        let polls = self.poll_service.list(page).await?;

        tracing::debug!(
            page = page.number(),
            updates = updates.updates.len(),
            polls = polls.polls.len(),
            "Merging feed page"
        );
        Ok(merge_feed(updates, polls))
    }
}
