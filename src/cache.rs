//! Rendered-page cache for the listing pages.
//!
//! Pages are cached only when requested without query parameters and
//! without pending flash messages. Mutating actions report the paths they
//! make stale and the routes evict them before redirecting. A rendering is
//! only served on the day it was made, since overdue markers depend on it.

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;

/// Listing pages eligible for caching.
pub const CACHEABLE_PATHS: [&str; 6] = [
    "/",
    "/inventory",
    "/materials",
    "/production",
    "/sales",
    "/quality",
];

#[derive(Debug, Clone)]
struct CachedPage {
    html: String,
    rendered_on: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct PageCache {
    pages: Arc<DashMap<String, CachedPage>>,
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cacheable(path: &str) -> bool {
        CACHEABLE_PATHS.contains(&path)
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.get_on(path, today())
    }

    /// Rendering of `path` made on `day`; older ones are dropped.
    pub fn get_on(&self, path: &str, day: NaiveDate) -> Option<String> {
        let page = self.pages.get(path).map(|entry| entry.value().clone())?;
        if page.rendered_on == day {
            return Some(page.html);
        }
        self.pages.remove_if(path, |_, cached| cached.rendered_on != day);
        log::debug!("Dropped cached page {path} rendered on {}", page.rendered_on);
        None
    }

    /// Store a rendering. Paths outside `CACHEABLE_PATHS` are ignored.
    pub fn insert(&self, path: &str, html: String) {
        self.insert_on(path, html, today());
    }

    pub fn insert_on(&self, path: &str, html: String, day: NaiveDate) {
        if Self::is_cacheable(path) {
            self.pages.insert(
                path.to_string(),
                CachedPage {
                    html,
                    rendered_on: day,
                },
            );
        }
    }

    /// Drop every cached rendering among `paths`.
    pub fn invalidate<I, S>(&self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for path in paths {
            if self.pages.remove(path.as_ref()).is_some() {
                log::debug!("Evicted cached page {}", path.as_ref());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
