pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;
/// Keeps `offset` within i64 for any limit.
pub const MAX_PAGE: i64 = i64::MAX / MAX_LIMIT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Clamps client supplied values: page within 1..=MAX_PAGE, limit within 1..=MAX_LIMIT.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1).min(MAX_PAGE);
        let limit = limit
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total_data: i64,
    pub total_page: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, req: PageRequest, total_data: i64) -> Self {
        Self {
            items,
            page: req.page,
            limit: req.limit,
            total_data,
            total_page: total_pages(total_data, req.limit),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total_data: self.total_data,
            total_page: self.total_page,
        }
    }
}

/// ceil(total / limit)
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}
