//! Offset pagination primitives shared by backend list endpoints.
//!
//! A [`PageRequest`] validates the caller supplied `page` and `limit` values
//! and derives the offset window. A [`Paginated`] envelope wraps one page of
//! results together with navigation links built from the request URL.
//!
//! Repositories are expected to fetch [`PageRequest::lookahead_limit`] rows (one
//! more than the page size) so the envelope can report whether another page
//! exists without issuing a separate count query.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Page number used when the caller does not supply one.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when the caller does not supply one.
pub const DEFAULT_LIMIT: u32 = 8;
/// Largest page size a caller may request.
pub const MAX_LIMIT: u32 = 100;

const PAGE_PARAM: &str = "page";
const LIMIT_PARAM: &str = "limit";

/// Validation failures raised when constructing a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// Pages are numbered from one.
    #[error("page must be at least 1")]
    ZeroPage,
    /// An empty page cannot be requested.
    #[error("limit must be at least 1")]
    ZeroLimit,
    /// The requested page size exceeds [`MAX_LIMIT`].
    #[error("limit must not exceed {max}")]
    LimitTooLarge {
        /// Maximum accepted page size.
        max: u32,
    },
}

/// Validated offset pagination window.
///
/// ## Invariants
/// - `page >= 1`
/// - `1 <= limit <= MAX_LIMIT`
///
/// # Examples
/// ```
/// use pagination::PageRequest;
///
/// let request = PageRequest::new(3, 10).expect("valid window");
/// assert_eq!(request.offset(), 20);
/// assert_eq!(request.lookahead_limit(), 11);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Validate an explicit page number and size.
    pub const fn new(page: u32, limit: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::ZeroPage);
        }
        if limit == 0 {
            return Err(PageRequestError::ZeroLimit);
        }
        if limit > MAX_LIMIT {
            return Err(PageRequestError::LimitTooLarge { max: MAX_LIMIT });
        }
        Ok(Self { page, limit })
    }

    /// Validate optional query values, applying [`DEFAULT_PAGE`] and
    /// [`DEFAULT_LIMIT`] when absent.
    pub fn from_optional(page: Option<u32>, limit: Option<u32>) -> Result<Self, PageRequestError> {
        Self::new(
            page.unwrap_or(DEFAULT_PAGE),
            limit.unwrap_or(DEFAULT_LIMIT),
        )
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of records on the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of records to skip: `(page - 1) * limit`.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Number of rows adapters should fetch to detect a following page.
    #[must_use]
    pub fn lookahead_limit(&self) -> u64 {
        u64::from(self.limit) + 1
    }

    /// Request for the following page, if the page counter does not overflow.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        self.page.checked_add(1).map(|page| Self {
            page,
            limit: self.limit,
        })
    }

    /// Request for the preceding page; `None` on the first page.
    #[must_use]
    pub fn previous(&self) -> Option<Self> {
        (self.page > 1).then(|| Self {
            page: self.page - 1,
            limit: self.limit,
        })
    }

    fn limit_len(&self) -> usize {
        usize::try_from(self.limit).unwrap_or(usize::MAX)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Navigation links attached to a [`Paginated`] envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationLinks {
    /// Link to the current page.
    #[serde(rename = "self")]
    pub current: String,
    /// Link to the following page when more records exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// Link to the preceding page unless this is the first page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

impl PaginationLinks {
    /// Render the links as an RFC 8288 `Link` header value.
    ///
    /// # Examples
    /// ```
    /// use pagination::PaginationLinks;
    ///
    /// let links = PaginationLinks {
    ///     current: "http://h/items?page=1&limit=2".to_owned(),
    ///     next: Some("http://h/items?page=2&limit=2".to_owned()),
    ///     prev: None,
    /// };
    /// assert_eq!(
    ///     links.to_link_header(),
    ///     r#"<http://h/items?page=1&limit=2>; rel="self", <http://h/items?page=2&limit=2>; rel="next""#
    /// );
    /// ```
    #[must_use]
    pub fn to_link_header(&self) -> String {
        let mut entries = vec![format!("<{}>; rel=\"self\"", self.current)];
        if let Some(next) = &self.next {
            entries.push(format!("<{next}>; rel=\"next\""));
        }
        if let Some(prev) = &self.prev {
            entries.push(format!("<{prev}>; rel=\"prev\""));
        }
        entries.join(", ")
    }
}

/// One page of results plus the window that produced it.
///
/// # Examples
/// ```
/// use pagination::{PageRequest, Paginated};
///
/// let request = PageRequest::new(1, 2).expect("valid window");
/// // The adapter fetched `lookahead_limit()` rows.
/// let page = Paginated::from_lookahead(vec![1, 2, 3], request);
/// assert_eq!(page.data(), &[1, 2]);
/// assert!(page.has_more());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    data: Vec<T>,
    page: u32,
    limit: u32,
    has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    links: Option<PaginationLinks>,
}

impl<T> Paginated<T> {
    /// Build an envelope from a look-ahead fetch of up to `limit + 1` rows.
    ///
    /// Rows beyond the page size are discarded and only signal `has_more`.
    #[must_use]
    pub fn from_lookahead(mut items: Vec<T>, request: PageRequest) -> Self {
        let limit = request.limit_len();
        let has_more = items.len() > limit;
        items.truncate(limit);
        Self {
            data: items,
            page: request.page(),
            limit: request.limit(),
            has_more,
            links: None,
        }
    }

    /// Attach navigation links derived from the request URL.
    ///
    /// Existing query parameters other than `page` and `limit` are preserved.
    #[must_use]
    pub fn with_links(mut self, base: &Url) -> Self {
        let request = PageRequest {
            page: self.page,
            limit: self.limit,
        };
        let next = if self.has_more {
            request.next().map(|next| page_url(base, next).to_string())
        } else {
            None
        };
        self.links = Some(PaginationLinks {
            current: page_url(base, request).to_string(),
            next,
            prev: request
                .previous()
                .map(|prev| page_url(base, prev).to_string()),
        });
        self
    }

    /// Transform every record while keeping the window metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            has_more: self.has_more,
            links: self.links,
        }
    }

    /// Records on this page.
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Consume the envelope, returning the records.
    #[must_use]
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Split the envelope into its records and any attached links.
    #[must_use]
    pub fn into_parts(self) -> (Vec<T>, Option<PaginationLinks>) {
        (self.data, self.links)
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Page size used for the query.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Whether at least one further record exists past this page.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    /// Navigation links, when attached.
    #[must_use]
    pub const fn links(&self) -> Option<&PaginationLinks> {
        self.links.as_ref()
    }
}

/// Rewrite `base` so its `page` and `limit` query parameters match `request`.
#[must_use]
pub fn page_url(base: &Url, request: PageRequest) -> Url {
    let retained: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != PAGE_PARAM && key != LIMIT_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = base.clone();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        pairs.append_pair(PAGE_PARAM, &request.page().to_string());
        pairs.append_pair(LIMIT_PARAM, &request.limit().to_string());
    }
    url
}
