use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageOptions {
    pub offset: i64,
    pub limit: i64,
}

impl PageOptions {
    /// Options for the 1-based `page` when every page holds `per_page` items. Page 0 is
    /// treated as page 1.
    pub fn for_page(page: u32, per_page: i64) -> PageOptions {
        let page = i64::from(page.max(1));
        PageOptions {
            offset: (page - 1) * per_page,
            limit: per_page,
        }
    }

    pub(crate) fn apply<T>(&self, items: impl Iterator<Item = T>) -> Vec<T> {
        items
            .skip(self.offset.max(0) as usize)
            .take(self.limit.max(0) as usize)
            .collect()
    }
}

/// One page of results along with the number of items across all pages.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64) -> Paginated<T> {
        Paginated { items, total }
    }
}
