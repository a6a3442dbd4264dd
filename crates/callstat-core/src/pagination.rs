//! Paging through a filtered call list
//!
//! A [`Pager`] remembers which dashboard generation it last showed. When a
//! newer view arrives the page goes back to the first one, so an offset
//! never survives a filter change.

use crate::error::{CallstatError, Result};
use crate::pipeline::DashboardView;

/// Calls per page in the recent-calls grid
pub const DEFAULT_PAGE_SIZE: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    page: usize,
    page_size: usize,
    seen_generation: Option<u64>,
}

impl Default for Pager {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            seen_generation: None,
        }
    }
}

impl Pager {
    pub fn new(page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(CallstatError::InvalidArgument(
                "page size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            page_size,
            ..Self::default()
        })
    }

    /// Zero-based current page
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Jump to a page; clamped on the next [`Pager::page_of`]
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Observe a view, returning to the first page if it is new
    ///
    /// Returns whether the page was reset.
    pub fn sync(&mut self, view: &DashboardView) -> bool {
        if self.seen_generation == Some(view.generation) {
            return false;
        }
        self.seen_generation = Some(view.generation);
        let reset = self.page != 0;
        self.page = 0;
        reset
    }

    /// Number of pages needed for `len` items, at least one
    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.page_size).max(1)
    }

    /// Items on the current page, clamping the page to the last one
    pub fn page_of<'a, T>(&mut self, items: &'a [T]) -> &'a [T] {
        self.page = self.page.min(self.total_pages(items.len()) - 1);
        let start = (self.page * self.page_size).min(items.len());
        let end = (start + self.page_size).min(items.len());
        &items[start..end]
    }

    /// Advance one page; returns false on the last page
    pub fn next(&mut self, len: usize) -> bool {
        if self.page + 1 < self.total_pages(len) {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page; returns false on the first page
    pub fn prev(&mut self) -> bool {
        if self.page > 0 {
            self.page -= 1;
            true
        } else {
            false
        }
    }
}
