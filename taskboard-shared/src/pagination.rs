/// Offset pagination for collection endpoints
///
/// Collections are returned as:
///
/// ```json
/// {
///   "data": [ ... ],
///   "meta": {
///     "current_page": 2,
///     "per_page": 10,
///     "total": 15,
///     "last_page": 2,
///     "from": 11,
///     "to": 15
///   }
/// }
/// ```

use serde::{Deserialize, Serialize};

/// Fixed page size for projects and tasks
pub const PER_PAGE: i64 = 10;

/// Raw `?page=` query parameter
///
/// Kept as a string so that garbage (`?page=abc`) falls back to page 1
/// instead of failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// Resolves the query into a page request with the fixed page size
    pub fn into_request(self) -> PageRequest {
        let page = self
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .unwrap_or(1);

        PageRequest::new(page, PER_PAGE)
    }
}

/// A validated page selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    per_page: i64,
}

impl PageRequest {
    /// Pages below 1 are clamped to 1; `per_page` below 1 becomes 1
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    /// SQL `LIMIT`
    pub fn limit(&self) -> i64 {
        self.per_page
    }

    /// SQL `OFFSET`
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, PER_PAGE)
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub current_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub last_page: i64,

    /// 1-based index of the first item on this page, `None` when empty
    pub from: Option<i64>,

    /// 1-based index of the last item on this page, `None` when empty
    pub to: Option<i64>,
}

impl PageMeta {
    pub fn new(request: PageRequest, total: i64, items_on_page: usize) -> Self {
        let last_page = ((total + request.per_page - 1) / request.per_page).max(1);
        let (from, to) = if items_on_page == 0 {
            (None, None)
        } else {
            let from = request.offset() + 1;
            (Some(from), Some(from + items_on_page as i64 - 1))
        };

        Self {
            current_page: request.page,
            per_page: request.per_page,
            total,
            last_page,
            from,
            to,
        }
    }
}

/// A page of items plus metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, request: PageRequest) -> Self {
        let meta = PageMeta::new(request, total, data.len());
        Self { data, meta }
    }

    /// Converts every item, keeping the metadata
    pub fn map<U, F>(self, f: F) -> Paginated<U>
    where
        F: FnMut(T) -> U,
    {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}
