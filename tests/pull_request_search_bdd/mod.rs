//! Support modules for the pull request search BDD tests.

pub(crate) mod harness;
pub(crate) mod state;

pub(crate) use harness::{
    SEARCH_ROUTE, mount_detail, mount_missing_detail, mount_rate_limit, mount_rejected_search,
    mount_search_page,
};
pub(crate) use state::SearchState;
