//! Pure state machine deciding when pagination stops.

use std::time::Duration;

use crate::github::models::MAX_RESULTS;

/// Bounds applied to one paginated search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationLimits {
    /// Items requested per page; a shorter page ends pagination.
    pub per_page: usize,
    /// Most records kept across all pages; excess is truncated.
    pub max_results: usize,
    /// Most pages requested.
    pub max_pages: u32,
    /// Pause before requesting each page after the first.
    pub page_delay: Duration,
}

impl Default for PaginationLimits {
    fn default() -> Self {
        Self {
            per_page: 100,
            max_results: MAX_RESULTS,
            max_pages: 5,
            page_delay: Duration::from_millis(250),
        }
    }
}

/// Position of the paginator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    /// About to request `page`, having kept `collected` records so far.
    Fetching {
        /// 1-based page number.
        page: u32,
        /// Records kept from earlier pages.
        collected: usize,
    },
    /// Page `page` arrived and is being filtered.
    Filtering {
        /// 1-based page number.
        page: u32,
        /// Records kept from earlier pages.
        collected: usize,
        /// Whether the raw page ended pagination.
        last_page: bool,
    },
    /// Pagination finished normally.
    Done,
    /// A request failed; no further pages are requested.
    Failed,
}

impl PageState {
    /// Initial state.
    pub const START: Self = Self::Fetching {
        page: 1,
        collected: 0,
    };

    /// Returns true for `Done` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Input driving [`transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    /// A page with `raw_len` items arrived.
    Fetched {
        /// Item count before filtering.
        raw_len: usize,
    },
    /// Filtering kept `kept` records of the current page.
    Filtered {
        /// Records kept after filtering and truncation.
        kept: usize,
    },
    /// The request or its decoding failed.
    Failed,
}

/// Computes the next state.
///
/// `Done` and `Failed` absorb every event. An event that does not fit the
/// current state moves the machine to `Failed`.
#[must_use]
pub fn transition(state: PageState, event: PageEvent, limits: &PaginationLimits) -> PageState {
    match (state, event) {
        (PageState::Done | PageState::Failed, _) => state,
        (_, PageEvent::Failed) => PageState::Failed,
        (PageState::Fetching { page, collected }, PageEvent::Fetched { raw_len }) => {
            PageState::Filtering {
                page,
                collected,
                last_page: raw_len < limits.per_page || page >= limits.max_pages,
            }
        }
        (
            PageState::Filtering {
                page,
                collected,
                last_page,
            },
            PageEvent::Filtered { kept },
        ) => {
            let total = collected.saturating_add(kept).min(limits.max_results);
            if last_page || total >= limits.max_results {
                PageState::Done
            } else {
                PageState::Fetching {
                    page: page.saturating_add(1),
                    collected: total,
                }
            }
        }
        (PageState::Fetching { .. }, PageEvent::Filtered { .. })
        | (PageState::Filtering { .. }, PageEvent::Fetched { .. }) => PageState::Failed,
    }
}
