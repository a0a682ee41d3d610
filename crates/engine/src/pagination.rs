//! Cursor pagination
//!
//! Every connection field resolves through one [`Page`]. A page decodes the
//! request's cursors under the connection's fingerprint, hands the adapter a
//! [`ScanRange`] one item wider than the page, and turns what comes back into
//! a [`Connection`] with page info.
//!
//! `first`/`after` scans forward from the lower bound; `last`/`before` scans
//! backward from the upper bound and reverses, so both directions return
//! items in the connection's natural order.
//!
//! Pages are independent: nested and sibling connections each build their
//! own, and nothing carries over between them.

use crate::limits::Limits;
use crate::query::QueryNode;
use chainql_core::cursor::{self, Cursor, CursorError, QueryFingerprint};
use chainql_core::{ChainqlError, ChainqlResult};
use chainql_storage::{ScanDirection, ScanRange};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

// ============================================================================
// Arguments
// ============================================================================

/// `first`/`after`/`last`/`before` as supplied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageArgs {
    /// Items from the front
    pub first: Option<usize>,
    /// Exclusive lower bound
    pub after: Option<Cursor>,
    /// Items from the back
    pub last: Option<usize>,
    /// Exclusive upper bound
    pub before: Option<Cursor>,
}

impl PageArgs {
    /// Read and check the pagination arguments of a connection field
    ///
    /// Cursors are only checked for shape here; they are decoded against
    /// the connection's fingerprint when the page is built.
    pub fn from_node(node: &QueryNode, limits: &Limits) -> ChainqlResult<Self> {
        let size = |key: &str| -> ChainqlResult<Option<usize>> {
            let Some(n) = node.u64_arg(key)? else {
                return Ok(None);
            };
            if n > limits.max_page_size as u64 {
                return Err(ChainqlError::too_complex(format!(
                    "'{}' of '{}' is {}, above the maximum page size {}",
                    key,
                    node.response_key(),
                    n,
                    limits.max_page_size
                )));
            }
            Ok(Some(n as usize))
        };

        let args = PageArgs {
            first: size("first")?,
            after: node.optional_str_arg("after")?.map(Cursor::new),
            last: size("last")?,
            before: node.optional_str_arg("before")?.map(Cursor::new),
        };
        if args.first.is_some() && args.last.is_some() {
            return Err(ChainqlError::invalid_input(format!(
                "'{}' accepts 'first' or 'last', not both",
                node.response_key()
            )));
        }
        Ok(args)
    }

    /// True when paging from the back
    pub fn is_backward(&self) -> bool {
        self.last.is_some()
    }
}

// ============================================================================
// State machine
// ============================================================================

/// Lifecycle of one paginated field resolution
///
/// ```text
/// Unstarted -> Scanning -> Satisfied | Exhausted | Failed
/// ```
///
/// `Satisfied` means the window is full and more items exist beyond it. A
/// later request restarts from a fresh `Unstarted` page at its cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    /// Cursors decoded, nothing read yet
    Unstarted,
    /// Adapter scan in flight
    Scanning,
    /// Window filled; more items exist in the scan direction
    Satisfied,
    /// Fewer items than requested; nothing more in the scan direction
    Exhausted,
    /// Scan failed
    Failed(String),
}

impl PageState {
    /// True once the page can no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PageState::Satisfied | PageState::Exhausted | PageState::Failed(_)
        )
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageState::Unstarted => f.write_str("unstarted"),
            PageState::Scanning => f.write_str("scanning"),
            PageState::Satisfied => f.write_str("satisfied"),
            PageState::Exhausted => f.write_str("exhausted"),
            PageState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

// ============================================================================
// Output
// ============================================================================

/// One item with its cursor
#[derive(Debug, Clone)]
pub struct Edge<T> {
    /// Position of this item
    pub cursor: Cursor,
    /// The item
    pub node: T,
}

/// Page boundaries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// More items after `end_cursor`
    pub has_next_page: bool,
    /// More items before `start_cursor`
    pub has_previous_page: bool,
    /// Cursor of the first edge
    pub start_cursor: Option<Cursor>,
    /// Cursor of the last edge
    pub end_cursor: Option<Cursor>,
}

/// A resolved page
#[derive(Debug, Clone)]
pub struct Connection<T> {
    /// Items in natural order
    pub edges: Vec<Edge<T>>,
    /// Boundaries
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    /// Transform every node
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Connection<U> {
        Connection {
            edges: self
                .edges
                .into_iter()
                .map(|e| Edge {
                    cursor: e.cursor,
                    node: f(e.node),
                })
                .collect(),
            page_info: self.page_info,
        }
    }
}

// ============================================================================
// Page
// ============================================================================

/// One paginated read over positions of type `K`
#[derive(Debug)]
pub struct Page<K> {
    after: Option<K>,
    before: Option<K>,
    limit: usize,
    backward: bool,
    fingerprint: QueryFingerprint,
    state: PageState,
}

impl<K> Page<K>
where
    K: Serialize + DeserializeOwned + Ord + Clone,
{
    /// Decode cursors under `fingerprint` and size the window
    pub fn new(args: &PageArgs, fingerprint: QueryFingerprint, limits: &Limits) -> ChainqlResult<Self> {
        let decode = |c: &Option<Cursor>| -> ChainqlResult<Option<K>> {
            c.as_ref()
                .map(|c| cursor::decode::<K>(c, &fingerprint))
                .transpose()
                .map_err(ChainqlError::InvalidCursor)
        };
        let after = decode(&args.after)?;
        let before = decode(&args.before)?;
        let limit = args.first.or(args.last).unwrap_or(limits.default_page_size);

        Ok(Page {
            after,
            before,
            limit,
            backward: args.is_backward(),
            fingerprint,
            state: PageState::Unstarted,
        })
    }

    /// Page size
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Current state
    pub fn state(&self) -> &PageState {
        &self.state
    }

    /// Move to `Scanning` and return the range to read
    ///
    /// The range asks for one item more than the page holds; the extra item
    /// only decides whether a further page exists.
    pub fn begin(&mut self) -> ChainqlResult<ScanRange<K>> {
        if self.state != PageState::Unstarted {
            return Err(ChainqlError::internal(format!("page scan started twice ({})", self.state)));
        }
        self.state = PageState::Scanning;
        Ok(ScanRange {
            after: self.after.clone(),
            before: self.before.clone(),
            direction: if self.backward {
                ScanDirection::Descending
            } else {
                ScanDirection::Ascending
            },
            limit: self.limit.saturating_add(1),
        })
    }

    /// Record a failed scan
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.state = PageState::Failed(reason.into());
    }

    /// Build the connection from items in scan order
    pub fn finish<T>(&mut self, mut items: Vec<(K, T)>) -> ChainqlResult<Connection<T>> {
        if self.state != PageState::Scanning {
            return Err(ChainqlError::internal(format!("page finished while {}", self.state)));
        }

        let overflow = items.len() > self.limit;
        items.truncate(self.limit);
        self.state = if overflow {
            PageState::Satisfied
        } else {
            PageState::Exhausted
        };
        if self.backward {
            items.reverse();
        }

        let edges = items
            .into_iter()
            .map(|(key, node)| {
                let cursor = cursor::encode(&key, &self.fingerprint).map_err(|e| match e {
                    CursorError::Encode(msg) => ChainqlError::internal(msg),
                    other => ChainqlError::InvalidCursor(other),
                })?;
                Ok(Edge { cursor, node })
            })
            .collect::<ChainqlResult<Vec<_>>>()?;

        let (has_previous_page, has_next_page) = if self.backward {
            (overflow || self.after.is_some(), self.before.is_some())
        } else {
            (self.after.is_some(), overflow || self.before.is_some())
        };
        let page_info = PageInfo {
            has_next_page,
            has_previous_page,
            start_cursor: edges.first().map(|e| e.cursor.clone()),
            end_cursor: edges.last().map(|e| e.cursor.clone()),
        };
        Ok(Connection { edges, page_info })
    }

    /// Paginate items already held in memory, sorted by key
    pub fn paginate<T>(&mut self, sorted: Vec<(K, T)>) -> ChainqlResult<Connection<T>> {
        let range = self.begin()?;
        let in_range = sorted.into_iter().filter(|(k, _)| range.contains(k));
        let window: Vec<(K, T)> = match range.direction {
            ScanDirection::Ascending => in_range.take(range.limit).collect(),
            ScanDirection::Descending => {
                let mut all: Vec<(K, T)> = in_range.collect();
                all.reverse();
                all.truncate(range.limit);
                all
            }
        };
        self.finish(window)
    }
}
