//! Page-number pagination over an ordered result set.
//!
//! The page token comes straight from the query string, so it is never
//! trusted: anything that is not a positive integer falls back to the first
//! page and numbers past the end clamp to the last page.

use std::num::IntErrorKind;

use serde::Serialize;

pub const POSTS_PER_PAGE: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: u64,
    per_page: u32,
}

/// The resolved slice of a result set: which page, and where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u32,
    pub num_pages: u32,
    pub offset: u64,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub num_pages: u32,
}

impl Paginator {
    pub fn new(count: u64, per_page: u32) -> Self {
        Self {
            count,
            per_page: per_page.max(1),
        }
    }

    /// An empty result set still has one (empty) page.
    pub fn num_pages(&self) -> u32 {
        let pages = self.count.div_ceil(u64::from(self.per_page));
        u32::try_from(pages).unwrap_or(u32::MAX).max(1)
    }

    pub fn window(&self, token: Option<&str>) -> PageWindow {
        let num_pages = self.num_pages();
        let number = match token.map(str::trim).map(str::parse::<u64>) {
            Some(Ok(n)) if n >= 1 => u32::try_from(n).unwrap_or(u32::MAX).min(num_pages),
            Some(Err(e)) if *e.kind() == IntErrorKind::PosOverflow => num_pages,
            _ => 1,
        };

        PageWindow {
            number,
            num_pages,
            offset: u64::from(number - 1) * u64::from(self.per_page),
            limit: self.per_page,
        }
    }
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self {
            items,
            number: window.number,
            num_pages: window.num_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn next_page_number(&self) -> Option<u32> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<u32> {
        self.has_previous().then(|| self.number - 1)
    }
}

/// Paginate an already materialised, ordered collection.
pub fn paginate<T>(items: Vec<T>, per_page: u32, token: Option<&str>) -> Page<T> {
    let window = Paginator::new(items.len() as u64, per_page).window(token);
    let slice = items
        .into_iter()
        .skip(window.offset as usize)
        .take(window.limit as usize)
        .collect();
    Page::new(slice, window)
}
