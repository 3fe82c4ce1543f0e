use serde::Serialize;

/// Page size used by listing pages unless they ask for something else.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// Page selection applied to repository list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number.
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Row offset of the first item on the page.
    pub fn offset(&self) -> i64 {
        ((self.page.max(1) - 1) * self.per_page) as i64
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// One page of items together with the navigation data templates need.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub pages: Vec<usize>,
    pub total_pages: usize,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: usize, total_pages: usize) -> Self {
        Self {
            items,
            page,
            pages: (1..=total_pages).collect(),
            total_pages,
        }
    }

    /// Build a page from the total row count returned by a list query.
    pub fn from_total(items: Vec<T>, page: usize, total: usize, per_page: usize) -> Self {
        Self::new(items, page, total.div_ceil(per_page.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_treats_page_zero_as_first_page() {
        let pagination = Pagination {
            page: 0,
            per_page: 20,
        };
        assert_eq!(pagination.offset(), 0);

        let pagination = Pagination {
            page: 3,
            per_page: 20,
        };
        assert_eq!(pagination.offset(), 40);
        assert_eq!(pagination.limit(), 20);
    }

    #[test]
    fn from_total_rounds_pages_up() {
        let page = Paginated::from_total(vec![1, 2, 3], 1, 45, 20);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.pages, vec![1, 2, 3]);
    }
}
