//! History listing filters.
//!
//! Filters are applied to the set already fetched from storage, never
//! pushed down into a new query. Date bounds are whole UTC days: the start
//! day from 00:00, the end day through 23:59:59.999.

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use serde::Deserialize;

use crate::types::{DbId, Timestamp};

/// Status filter value meaning "no status filter".
pub const STATUS_ALL: &str = "all";

pub const EMPTY_SEARCH_MESSAGE: &str = "No campaigns found matching your search.";
pub const EMPTY_HISTORY_MESSAGE: &str = "No approved campaigns yet.";

/// A listable history row.
pub trait HistoryRow {
    fn id(&self) -> DbId;
    fn created_at(&self) -> Timestamp;
    fn status(&self) -> &str;
}

/// Client-side filters over the fetched history set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HistoryFilter {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// `None`, empty, or `"all"` disables the status filter.
    #[serde(default)]
    pub status: Option<String>,
}

impl HistoryFilter {
    fn status_filter(&self) -> Option<&str> {
        self.status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != STATUS_ALL)
    }

    fn lower_bound(&self) -> Option<Timestamp> {
        self.start_date.map(|d| d.and_time(NaiveTime::MIN).and_utc())
    }

    /// Last millisecond of the end day. The last representable day has no
    /// successor, so it leaves the range open.
    fn upper_bound(&self) -> Option<Timestamp> {
        let next = self.end_date?.succ_opt()?;
        Some(next.and_time(NaiveTime::MIN).and_utc() - TimeDelta::milliseconds(1))
    }

    pub fn matches<R: HistoryRow>(&self, row: &R) -> bool {
        let created = row.created_at();
        if self.lower_bound().is_some_and(|start| created < start) {
            return false;
        }
        if self.upper_bound().is_some_and(|end| created > end) {
            return false;
        }
        match self.status_filter() {
            Some(status) => row.status() == status,
            None => true,
        }
    }

    /// Filter the fetched set, keeping its order.
    pub fn apply<R: HistoryRow + Clone>(&self, rows: &[R]) -> Vec<R> {
        rows.iter().filter(|r| self.matches(*r)).cloned().collect()
    }
}

/// Message for an empty listing.
pub fn empty_message(search_term: Option<&str>) -> &'static str {
    match search_term.map(str::trim) {
        Some(term) if !term.is_empty() => EMPTY_SEARCH_MESSAGE,
        _ => EMPTY_HISTORY_MESSAGE,
    }
}

/// Which history row is expanded. At most one at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpandedRow(Option<DbId>);

impl ExpandedRow {
    pub fn current(&self) -> Option<DbId> {
        self.0
    }

    pub fn is_expanded(&self, id: DbId) -> bool {
        self.0 == Some(id)
    }

    /// Expand `id`, or collapse it when it is already expanded.
    pub fn toggle(&mut self, id: DbId) {
        self.0 = if self.0 == Some(id) { None } else { Some(id) };
    }

    fn collapse(&mut self) {
        self.0 = None;
    }
}

/// One user's history view: the last fetched set, the search that
/// produced it, and the expanded row.
///
/// Filters and expand toggles work on the cached set. Only [`replace`]
/// (a search or refresh) changes which rows are visible to filtering.
///
/// [`replace`]: HistorySession::replace
#[derive(Debug, Clone)]
pub struct HistorySession<R> {
    search: Option<String>,
    rows: Option<Vec<R>>,
    expanded: ExpandedRow,
}

impl<R> Default for HistorySession<R> {
    fn default() -> Self {
        Self {
            search: None,
            rows: None,
            expanded: ExpandedRow::default(),
        }
    }
}

impl<R: HistoryRow + Clone> HistorySession<R> {
    pub fn is_fetched(&self) -> bool {
        self.rows.is_some()
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn expanded(&self) -> Option<DbId> {
        self.expanded.current()
    }

    /// Store a freshly fetched set. An expanded row missing from it collapses.
    pub fn replace(&mut self, search: Option<&str>, rows: Vec<R>) {
        if let Some(id) = self.expanded.current() {
            if !rows.iter().any(|r| r.id() == id) {
                self.expanded.collapse();
            }
        }
        self.search = search.map(str::to_string);
        self.rows = Some(rows);
    }

    /// The cached set with `filter` applied. Empty before the first fetch.
    pub fn visible(&self, filter: &HistoryFilter) -> Vec<R> {
        self.rows
            .as_deref()
            .map(|rows| filter.apply(rows))
            .unwrap_or_default()
    }

    /// Toggle expansion of a cached row. Returns `false` when `id` is not in
    /// the cached set.
    pub fn toggle(&mut self, id: DbId) -> bool {
        let known = self
            .rows
            .as_deref()
            .is_some_and(|rows| rows.iter().any(|r| r.id() == id));
        if known {
            self.expanded.toggle(id);
        }
        known
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[derive(Debug, Clone)]
    struct Row {
        id: DbId,
        created_at: Timestamp,
        status: &'static str,
    }

    impl HistoryRow for Row {
        fn id(&self) -> DbId {
            self.id
        }
        fn created_at(&self) -> Timestamp {
            self.created_at
        }
        fn status(&self) -> &str {
            self.status
        }
    }

    fn row(day: u32, hour: u32, status: &'static str) -> Row {
        Row {
            id: uuid::Uuid::new_v4(),
            created_at: Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap(),
            status,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn test_no_filters_keep_everything() {
        let rows = vec![row(1, 0, "draft"), row(2, 0, "approved")];
        assert_eq!(HistoryFilter::default().apply(&rows).len(), 2);
    }

    #[test]
    fn test_end_date_is_inclusive_of_whole_day() {
        let rows = vec![row(3, 23, "draft"), row(4, 0, "draft")];
        let filter = HistoryFilter {
            end_date: Some(date(3)),
            ..Default::default()
        };
        let out = filter.apply(&rows);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].created_at, rows[0].created_at);
    }

    #[test]
    fn test_end_date_at_calendar_max_is_unbounded() {
        let end_date: NaiveDate = "+262142-12-31".parse().unwrap();
        assert_eq!(end_date, NaiveDate::MAX);
        let rows = vec![row(1, 0, "draft"), row(2, 0, "approved")];
        let filter = HistoryFilter {
            end_date: Some(end_date),
            ..Default::default()
        };
        assert_eq!(filter.apply(&rows).len(), 2);

        let filter = HistoryFilter {
            start_date: Some(NaiveDate::MAX),
            end_date: Some(NaiveDate::MAX),
            ..Default::default()
        };
        assert!(filter.apply(&rows).is_empty());
    }

    #[test]
    fn test_start_date_inclusive() {
        let rows = vec![row(2, 23, "draft"), row(3, 0, "draft")];
        let filter = HistoryFilter {
            start_date: Some(date(3)),
            ..Default::default()
        };
        assert_eq!(filter.apply(&rows).len(), 1);
    }

    #[test]
    fn test_status_filter_exact_match() {
        let rows = vec![row(1, 0, "draft"), row(1, 1, "approved")];
        let filter = HistoryFilter {
            status: Some("approved".into()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&rows).len(), 1);
        let all = HistoryFilter {
            status: Some(STATUS_ALL.into()),
            ..Default::default()
        };
        assert_eq!(all.apply(&rows).len(), 2);
    }

    #[test]
    fn test_excluding_date_range_empties_regardless_of_status() {
        let rows = vec![row(1, 0, "approved"), row(2, 0, "approved")];
        let filter = HistoryFilter {
            start_date: Some(date(10)),
            end_date: Some(date(12)),
            status: Some("approved".into()),
        };
        let out = filter.apply(&rows);
        assert!(out.is_empty());
        assert_eq!(empty_message(None), EMPTY_HISTORY_MESSAGE);
    }

    #[test]
    fn test_empty_message_mentions_search() {
        assert_eq!(empty_message(Some("spring")), EMPTY_SEARCH_MESSAGE);
        assert_eq!(empty_message(Some("  ")), EMPTY_HISTORY_MESSAGE);
    }

    #[test]
    fn test_single_row_expanded() {
        let a = uuid::Uuid::from_u128(1);
        let b = uuid::Uuid::from_u128(2);
        let mut expanded = ExpandedRow::default();
        expanded.toggle(a);
        assert!(expanded.is_expanded(a));
        expanded.toggle(b);
        assert!(!expanded.is_expanded(a));
        assert!(expanded.is_expanded(b));
        expanded.toggle(b);
        assert_eq!(expanded.current(), None);
    }

    // ----

    #[test]
    fn test_session_filters_cached_rows_only() {
        let mut session = HistorySession::default();
        assert!(!session.is_fetched());
        assert!(session.visible(&HistoryFilter::default()).is_empty());

        session.replace(None, vec![row(1, 0, "draft"), row(2, 0, "approved")]);
        let approved = HistoryFilter {
            status: Some("approved".into()),
            ..Default::default()
        };
        assert_eq!(session.visible(&approved).len(), 1);
        assert_eq!(session.visible(&HistoryFilter::default()).len(), 2);
        assert_eq!(session.search_term(), None);
    }

    #[test]
    fn test_session_toggle_requires_cached_row() {
        let rows = vec![row(1, 0, "draft"), row(2, 0, "draft")];
        let (a, b) = (rows[0].id, rows[1].id);
        let mut session = HistorySession::default();
        assert!(!session.toggle(a));

        session.replace(Some("spring"), rows.clone());
        assert!(session.toggle(a));
        assert!(session.toggle(b));
        assert_eq!(session.expanded(), Some(b));
        assert!(!session.toggle(uuid::Uuid::new_v4()));
        assert_eq!(session.expanded(), Some(b));

        session.replace(None, vec![rows[0].clone()]);
        assert_eq!(session.expanded(), None);
        assert_eq!(session.search_term(), None);
    }
}
