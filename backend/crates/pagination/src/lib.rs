//! Cursor and page envelope primitives shared by listing endpoints.
//!
//! Listings are keyset-paginated on a creation timestamp with the row id as a
//! tiebreak: the cursor is the `created_at` of the last item a client has
//! seen, encoded as milliseconds since the Unix epoch, optionally followed by
//! `:` and that item's UUID. A page request always fetches one row more than
//! the page size so [`Page::from_overfetched`] can report whether another
//! page exists without a second `COUNT` query.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Largest page a client may request.
pub const MAX_PAGE_SIZE: usize = 50;

/// Errors raised while decoding pagination parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// The cursor is not `<millis>` or `<millis>:<uuid>`.
    #[error("cursor '{value}' is not a millisecond timestamp")]
    MalformedCursor {
        /// Raw cursor text supplied by the client.
        value: String,
    },
    /// The cursor parses but lies outside the representable date range.
    #[error("cursor {millis} is outside the supported timestamp range")]
    CursorOutOfRange {
        /// Parsed millisecond value.
        millis: i64,
    },
}

/// Opaque-to-clients position within a creation-time ordered listing.
///
/// # Examples
/// ```
/// use pagination::TimestampCursor;
///
/// let cursor: TimestampCursor = "1628500554962".parse().expect("valid cursor");
/// assert_eq!(cursor.to_string(), "1628500554962");
///
/// let keyed = "1628500554962:67e55044-10b1-426f-9247-bb680e5fe0c8";
/// let cursor: TimestampCursor = keyed.parse().expect("valid cursor");
/// assert!(cursor.tiebreak().is_some());
/// assert_eq!(cursor.to_string(), keyed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimestampCursor {
    timestamp: DateTime<Utc>,
    tiebreak: Option<Uuid>,
}

impl TimestampCursor {
    /// Build a cursor positioned at `timestamp`; rows sharing it are skipped.
    #[must_use]
    pub const fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            tiebreak: None,
        }
    }

    /// Build a cursor positioned at the row `(timestamp, id)`.
    ///
    /// Rows sharing `timestamp` with an id ordered below `id` stay visible.
    #[must_use]
    pub const fn at(timestamp: DateTime<Utc>, id: Uuid) -> Self {
        Self {
            timestamp,
            tiebreak: Some(id),
        }
    }

    /// Build a cursor from milliseconds since the Unix epoch.
    ///
    /// # Errors
    /// Returns [`PaginationError::CursorOutOfRange`] when `millis` cannot be
    /// represented as a UTC timestamp.
    pub fn from_millis(millis: i64) -> Result<Self, PaginationError> {
        Utc.timestamp_millis_opt(millis)
            .single()
            .map(Self::new)
            .ok_or(PaginationError::CursorOutOfRange { millis })
    }

    /// Timestamp the cursor points at.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Id of the last row seen at [`Self::timestamp`], if the cursor has one.
    #[must_use]
    pub const fn tiebreak(&self) -> Option<Uuid> {
        self.tiebreak
    }

    /// Milliseconds since the Unix epoch.
    #[must_use]
    pub fn as_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    /// Whether the row `(created_at, id)` lies past the cursor in
    /// newest-first order.
    ///
    /// # Examples
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use pagination::TimestampCursor;
    /// use uuid::Uuid;
    ///
    /// let at = Utc.timestamp_millis_opt(1_000).single().expect("timestamp");
    /// let cursor = TimestampCursor::at(at, Uuid::from_u128(5));
    /// assert!(cursor.admits(at, &Uuid::from_u128(4)));
    /// assert!(!cursor.admits(at, &Uuid::from_u128(5)));
    /// assert!(!TimestampCursor::new(at).admits(at, &Uuid::from_u128(4)));
    /// ```
    #[must_use]
    pub fn admits(&self, created_at: DateTime<Utc>, id: &Uuid) -> bool {
        created_at < self.timestamp
            || (created_at == self.timestamp && self.tiebreak.is_some_and(|last| *id < last))
    }
}

impl FromStr for TimestampCursor {
    type Err = PaginationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || PaginationError::MalformedCursor {
            value: value.to_owned(),
        };
        let trimmed = value.trim();
        let (millis, tiebreak) = match trimmed.split_once(':') {
            Some((millis, id)) => (millis, Some(Uuid::parse_str(id).map_err(|_| malformed())?)),
            None => (trimmed, None),
        };
        let millis = millis.parse::<i64>().map_err(|_| malformed())?;
        let cursor = Self::from_millis(millis)?;
        Ok(Self {
            tiebreak,
            ..cursor
        })
    }
}

impl fmt::Display for TimestampCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tiebreak {
            Some(id) => write!(f, "{}:{id}", self.as_millis()),
            None => write!(f, "{}", self.as_millis()),
        }
    }
}

/// Validated page request: a clamped page size and an optional cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    limit: usize,
    cursor: Option<TimestampCursor>,
}

impl PageRequest {
    /// Build a request, clamping `limit` into `1..=MAX_PAGE_SIZE`.
    ///
    /// # Examples
    /// ```
    /// use pagination::{PageRequest, MAX_PAGE_SIZE};
    ///
    /// assert_eq!(PageRequest::new(500, None).limit(), MAX_PAGE_SIZE);
    /// assert_eq!(PageRequest::new(-3, None).limit(), 1);
    /// assert_eq!(PageRequest::new(10, None).fetch_size(), 11);
    /// ```
    #[must_use]
    pub fn new(limit: i64, cursor: Option<TimestampCursor>) -> Self {
        let clamped = usize::try_from(limit.max(1))
            .unwrap_or(MAX_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        Self {
            limit: clamped,
            cursor,
        }
    }

    /// Parse the raw query values a transport adapter received.
    ///
    /// # Errors
    /// Returns a [`PaginationError`] when the cursor is present but invalid.
    pub fn parse(limit: i64, cursor: Option<&str>) -> Result<Self, PaginationError> {
        let cursor = cursor
            .filter(|raw| !raw.trim().is_empty())
            .map(str::parse)
            .transpose()?;
        Ok(Self::new(limit, cursor))
    }

    /// Number of items a page may contain.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Cursor to continue from, if any.
    #[must_use]
    pub const fn cursor(&self) -> Option<TimestampCursor> {
        self.cursor
    }

    /// Rows to request from storage: one more than the page size.
    #[must_use]
    pub const fn fetch_size(&self) -> usize {
        self.limit + 1
    }
}

/// A page of results and whether more exist beyond it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page, in listing order.
    pub items: Vec<T>,
    /// True when the store held at least one more row past this page.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Build a page from rows fetched with [`PageRequest::fetch_size`].
    ///
    /// # Examples
    /// ```
    /// use pagination::{Page, PageRequest};
    ///
    /// let request = PageRequest::new(2, None);
    /// let page = Page::from_overfetched(vec![1, 2, 3], &request);
    /// assert_eq!(page.items, vec![1, 2]);
    /// assert!(page.has_more);
    /// ```
    #[must_use]
    pub fn from_overfetched(mut rows: Vec<T>, request: &PageRequest) -> Self {
        let has_more = rows.len() > request.limit();
        rows.truncate(request.limit());
        Self {
            items: rows,
            has_more,
        }
    }

    /// Transform every item while keeping the `has_more` flag.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            has_more: self.has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for cursor parsing and page assembly.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 1)]
    #[case(1, 1)]
    #[case(10, 10)]
    #[case(50, 50)]
    #[case(51, 50)]
    #[case(i64::MAX, 50)]
    fn limit_is_clamped(#[case] requested: i64, #[case] expected: usize) {
        assert_eq!(PageRequest::new(requested, None).limit(), expected);
    }

    #[rstest]
    #[case("abc")]
    #[case("12.5")]
    #[case("")]
    fn malformed_cursor_is_rejected(#[case] raw: &str) {
        let err = raw.parse::<TimestampCursor>().expect_err("cursor must fail");
        assert!(matches!(err, PaginationError::MalformedCursor { .. }));
    }

    #[rstest]
    fn out_of_range_cursor_is_rejected() {
        let err = TimestampCursor::from_millis(i64::MAX).expect_err("range check");
        assert_eq!(err, PaginationError::CursorOutOfRange { millis: i64::MAX });
    }

    #[rstest]
    fn blank_cursor_is_treated_as_first_page() {
        let request = PageRequest::parse(5, Some("  ")).expect("blank cursor accepted");
        assert!(request.cursor().is_none());
    }

    #[rstest]
    fn cursor_keeps_millisecond_precision() {
        let cursor: TimestampCursor = "1628500554962".parse().expect("valid cursor");
        assert_eq!(cursor.as_millis(), 1_628_500_554_962);
        assert_eq!(cursor.timestamp().timestamp_subsec_millis(), 962);
    }

    #[rstest]
    #[case("1628500554962:not-a-uuid")]
    #[case(":67e55044-10b1-426f-9247-bb680e5fe0c8")]
    fn malformed_keyed_cursor_is_rejected(#[case] raw: &str) {
        let err = raw.parse::<TimestampCursor>().expect_err("cursor must fail");
        assert!(matches!(err, PaginationError::MalformedCursor { .. }));
    }

    #[rstest]
    fn keyed_cursor_admits_lower_ids_at_the_same_instant() {
        let at = Utc
            .timestamp_millis_opt(1_628_500_554_962)
            .single()
            .expect("timestamp");
        let earlier = Utc
            .timestamp_millis_opt(1_628_500_554_961)
            .single()
            .expect("timestamp");
        let cursor = TimestampCursor::at(at, Uuid::from_u128(10));

        assert!(cursor.admits(at, &Uuid::from_u128(9)));
        assert!(!cursor.admits(at, &Uuid::from_u128(11)));
        assert!(cursor.admits(earlier, &Uuid::from_u128(11)));
        assert!(!TimestampCursor::new(at).admits(at, &Uuid::from_u128(9)));
    }

    #[rstest]
    #[case(vec![1, 2, 3], 3, false)]
    #[case(vec![1, 2, 3, 4], 3, true)]
    #[case(vec![], 3, false)]
    fn page_reports_has_more_from_extra_row(
        #[case] rows: Vec<u8>,
        #[case] limit: i64,
        #[case] has_more: bool,
    ) {
        let request = PageRequest::new(limit, None);
        let page = Page::from_overfetched(rows, &request);
        assert_eq!(page.has_more, has_more);
        assert!(page.items.len() <= request.limit());
    }

    #[rstest]
    fn page_serialises_in_camel_case() {
        let page = Page {
            items: vec!["a"],
            has_more: true,
        };
        let json = serde_json::to_value(&page).expect("serialise page");
        assert_eq!(json["hasMore"], serde_json::Value::Bool(true));
    }
}
