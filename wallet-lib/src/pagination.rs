use serde::{Deserialize, Serialize};
use wallet_repo::page::{PageOptions, Paginated};

pub const ITEMS_PER_PAGE: i64 = 10;

/// `?page=` query parameter. Pages start at 1.
#[derive(Deserialize, Debug, Default, Clone, Copy)]
pub struct PageQuery {
    pub page: Option<u32>,
}

impl PageQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn options(&self) -> PageOptions {
        PageOptions::for_page(self.page(), ITEMS_PER_PAGE)
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: i64,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(paginated: Paginated<T>, query: PageQuery) -> Page<T> {
        Page {
            items: paginated.items,
            page: query.page(),
            per_page: ITEMS_PER_PAGE,
            total: paginated.total,
        }
    }
}
