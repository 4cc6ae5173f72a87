//! Relay-style cursor connection over a ranked sequence.
//!
//! Positions are resolved by binary search on the `(score, user_id)` key
//! carried in the cursor rather than by offset, so a cursor still lands in
//! the right place when unrelated entries enter or leave the leaderboard
//! between two page requests.

use serde::Deserialize;
use std::cmp::Ordering;

use super::cursor::{decode_cursor, encode_cursor};
use super::RankingError;
use crate::models::{Connection, Direction, Edge, PageInfo, RankKey, RankedUser, ScoredUser};

/// Raw pagination arguments as received from the caller
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageArgs {
    pub first: Option<i64>,
    pub after: Option<String>,
    pub last: Option<i64>,
    pub before: Option<String>,
}

impl PageArgs {
    pub fn first(first: i64) -> Self {
        Self {
            first: Some(first),
            ..Self::default()
        }
    }

    pub fn last(last: i64) -> Self {
        Self {
            last: Some(last),
            ..Self::default()
        }
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Applied as `first` when neither `first` nor `last` is given
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    First(usize),
    Last(usize),
}

/// Validated pagination request with decoded cursors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub order: Direction,
    pub size: PageSize,
    pub after: Option<RankKey>,
    pub before: Option<RankKey>,
}

impl PageRequest {
    /// Validate raw arguments for a sequence ranked in `order`.
    ///
    /// Runs before any ledger read so bad input never costs an aggregation.
    pub fn parse(args: PageArgs, order: Direction, limits: &PageLimits) -> Result<Self, RankingError> {
        let size = match (args.first, args.last) {
            (Some(_), Some(_)) => {
                return Err(RankingError::InvalidInput(
                    "Arguments `first` and `last` are mutually exclusive".to_string(),
                ))
            }
            (Some(first), None) => PageSize::First(page_len("first", first, limits)?),
            (None, Some(last)) => PageSize::Last(page_len("last", last, limits)?),
            (None, None) => PageSize::First(limits.default_page_size),
        };

        let after = non_empty(args.after).map(|c| decode_cursor(&c)).transpose()?;
        let before = non_empty(args.before).map(|c| decode_cursor(&c)).transpose()?;

        if let (Some(after), Some(before)) = (&after, &before) {
            if order.compare(after, before) != Ordering::Less {
                return Err(RankingError::InvalidInput(
                    "Cursor `after` must sort before cursor `before`".to_string(),
                ));
            }
        }

        Ok(Self {
            order,
            size,
            after,
            before,
        })
    }
}

fn page_len(name: &str, value: i64, limits: &PageLimits) -> Result<usize, RankingError> {
    match usize::try_from(value) {
        Ok(len) if len <= limits.max_page_size => Ok(len),
        Ok(_) => Err(RankingError::InvalidInput(format!(
            "Argument `{}` must not exceed {}",
            name, limits.max_page_size
        ))),
        Err(_) => Err(RankingError::InvalidInput(format!(
            "Argument `{}` must be non-negative",
            name
        ))),
    }
}

fn non_empty(cursor: Option<String>) -> Option<String> {
    cursor.filter(|c| !c.is_empty())
}

/// Slice a ranked sequence into one connection page.
///
/// `ranked` must be sorted by `request.order` (see [`super::rank::rank`]).
pub fn paginate(ranked: &[ScoredUser], request: &PageRequest) -> Connection<RankedUser> {
    let order = request.order;
    let total = ranked.len();

    // [lower, upper) is the part of the sequence between the two cursors
    let lower = match &request.after {
        Some(after) => {
            ranked.partition_point(|u| order.compare(&u.key(), after) != Ordering::Greater)
        }
        None => 0,
    };
    let upper = match &request.before {
        Some(before) => ranked.partition_point(|u| order.compare(&u.key(), before) == Ordering::Less),
        None => total,
    }
    .max(lower);

    let (start, end) = match request.size {
        PageSize::First(n) => (lower, upper.min(lower.saturating_add(n))),
        PageSize::Last(n) => (upper.saturating_sub(n).max(lower), upper),
    };

    let edges: Vec<Edge<RankedUser>> = ranked[start..end]
        .iter()
        .map(|user| Edge {
            node: RankedUser::from(user),
            cursor: encode_cursor(&user.key()),
        })
        .collect();

    let page_info = PageInfo {
        has_next_page: end < total,
        has_previous_page: start > 0,
        start_cursor: edges.first().map(|e| e.cursor.clone()),
        end_cursor: edges.last().map(|e| e.cursor.clone()),
    };

    Connection {
        edges,
        page_info,
        total_count: total,
    }
}
