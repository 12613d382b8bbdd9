//! Page requests and paginated result envelopes.

use serde::Serialize;

use crate::error::Result;

/// The page a caller asked for. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1 }
    }
}

impl PageRequest {
    /// Pages below 1 are clamped to 1.
    pub fn new(page: u32) -> Self {
        Self { page: page.max(1) }
    }

    /// Reads the `page` parameter of a URL query string such as `page=3&sort=name`.
    ///
    /// A missing parameter means page 1. The value is read like a lenient
    /// integer parse: leading digits count, anything else reads as 0 and is
    /// clamped to 1.
    pub fn from_query(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let page = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "page")
            .map(|(_, value)| leading_int(value))
            .unwrap_or(1);
        Self::new(page)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Row offset of this page for pages of `per_page` rows.
    ///
    /// Capped at `i64::MAX`, the largest offset SQLite accepts in `LIMIT`.
    pub fn offset(&self, per_page: u32) -> u64 {
        let offset = u64::from(self.page - 1) * u64::from(per_page);
        offset.min(i64::MAX as u64)
    }
}

impl From<u32> for PageRequest {
    fn from(page: u32) -> Self {
        Self::new(page)
    }
}

fn leading_int(value: &str) -> u32 {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(if digits.is_empty() { 0 } else { u32::MAX })
}

/// Navigation details attached to a page when requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub last_page: u64,
    /// 1-based position of the first item on this page, if any.
    pub from: Option<u64>,
    /// 1-based position of the last item on this page, if any.
    pub to: Option<u64>,
    pub has_prev: bool,
    pub has_next: bool,
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub per_page: u32,
    pub current_page: u32,
    pub total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

impl<T> Paginated<T> {
    pub fn new(
        items: Vec<T>,
        per_page: u32,
        current_page: u32,
        total: u64,
        include_meta: bool,
    ) -> Self {
        let meta = include_meta.then(|| {
            let per_page = u64::from(per_page.max(1));
            let last_page = total.div_ceil(per_page).max(1);
            let offset = u64::from(current_page.saturating_sub(1)) * per_page;
            let count = items.len() as u64;
            PageMeta {
                last_page,
                from: (count > 0).then_some(offset + 1),
                to: (count > 0).then_some(offset + count),
                has_prev: current_page > 1,
                has_next: u64::from(current_page) < last_page,
            }
        });

        Self {
            items,
            per_page,
            current_page,
            total,
            meta,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Converts every item, keeping the page information.
    pub fn try_map<U, F>(self, f: F) -> Result<Paginated<U>>
    where
        F: FnMut(T) -> Result<U>,
    {
        let items = self.items.into_iter().map(f).collect::<Result<Vec<_>>>()?;
        Ok(Paginated {
            items,
            per_page: self.per_page,
            current_page: self.current_page,
            total: self.total,
            meta: self.meta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults_and_clamps() {
        assert_eq!(PageRequest::default().page(), 1);
        assert_eq!(PageRequest::new(0).page(), 1);
        assert_eq!(PageRequest::new(3).offset(10), 20);
        assert_eq!(PageRequest::new(1).offset(10), 0);
    }

    #[test]
    fn test_page_request_from_query() {
        assert_eq!(PageRequest::from_query("page=3").page(), 3);
        assert_eq!(PageRequest::from_query("?sort=name&page=4").page(), 4);
        assert_eq!(PageRequest::from_query("sort=name").page(), 1);
        assert_eq!(PageRequest::from_query("page=abc").page(), 1);
        assert_eq!(PageRequest::from_query("page=-2").page(), 1);
        assert_eq!(PageRequest::from_query("page=7xyz").page(), 7);
        assert_eq!(PageRequest::from_query("").page(), 1);
    }

    #[test]
    fn test_offset_is_capped_for_huge_pages() {
        let request = PageRequest::from_query("page=99999999999");
        assert_eq!(request.page(), u32::MAX);
        assert_eq!(request.offset(u32::MAX), i64::MAX as u64);
        assert_eq!(request.offset(1), u64::from(u32::MAX - 1));
    }

    #[test]
    fn test_meta_for_middle_and_last_page() {
        let page = Paginated::new(vec![1; 10], 10, 2, 25, true);
        let meta = page.meta.unwrap();
        assert_eq!(meta.last_page, 3);
        assert_eq!(meta.from, Some(11));
        assert_eq!(meta.to, Some(20));
        assert!(meta.has_prev);
        assert!(meta.has_next);

        let page = Paginated::new(vec![1; 5], 10, 3, 25, true);
        let meta = page.meta.unwrap();
        assert_eq!(meta.from, Some(21));
        assert_eq!(meta.to, Some(25));
        assert!(!meta.has_next);
    }

    #[test]
    fn test_meta_for_empty_result() {
        let page: Paginated<i32> = Paginated::new(vec![], 10, 1, 0, true);
        let meta = page.meta.unwrap();
        assert_eq!(meta.last_page, 1);
        assert_eq!(meta.from, None);
        assert!(!meta.has_prev);
        assert!(!meta.has_next);
    }

    #[test]
    fn test_meta_is_optional() {
        let page = Paginated::new(vec!["a"], 10, 1, 1, false);
        assert!(page.meta.is_none());
        let json = serde_json::to_value(&page).unwrap();
        assert!(json.get("meta").is_none());
        assert_eq!(json["total"], 1);
    }
}
