//! Pagination utilities for service layer
//!
//! `Pagination` carries the caller's 1-based page request, `Window` is the
//! offset/limit handed to repositories and `Page` is what comes back.

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;
pub const CATEGORY_PAGE_SIZE: u32 = 10;
pub const PRODUCT_PAGE_SIZE: u32 = 15;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    /// Fill missing values, using `default_per_page` when no size was given.
    pub fn new(page: Option<u32>, per_page: Option<u32>, default_per_page: u32) -> Self {
        Self { page: page.unwrap_or(1), per_page: per_page.unwrap_or(default_per_page) }
    }

    /// Clamp to sane defaults and convert to `u64` as `(page_index, per_page)`.
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, MAX_PAGE_SIZE);
        ((page - 1) as u64, per_page as u64)
    }

    pub fn window(self) -> Window {
        let (page_idx, per_page) = self.normalize();
        Window { offset: page_idx * per_page, limit: per_page }
    }

    /// Wrap one window of results with the normalized request and the total.
    pub fn page<T>(self, items: Vec<T>, total_items: u64) -> Page<T> {
        let (page_idx, per_page) = self.normalize();
        Page { items, page_number: page_idx as u32 + 1, page_size: per_page as u32, total_items }
    }
}

/// Skip/take over an ordered sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: u64,
}

impl Window {
    /// Apply the window to an already ordered in-memory sequence.
    pub fn apply<T>(self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let skip = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let take = usize::try_from(self.limit).unwrap_or(usize::MAX);
        items.into_iter().skip(skip).take(take).collect()
    }
}

/// One page of an ordered listing.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_items: u64,
}
