//! Cursor-stack pagination over `get_table_rows`
//!
//! Rows are read newest-first (`reverse = true`). Each visited page keeps
//! the upper bound it was fetched with; the page index is the depth of that
//! stack. Going back re-issues the request for the previous entry.

/// How a page request moves the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// First page of a scope, or a reload after the search is cleared
    Initial,
    Forward,
    Backward,
    /// Fetch the next page and append it to the rows already shown
    Append,
    /// Exact-key lookup, `lower_bound == upper_bound`
    Lookup,
    /// Re-issue the current page
    Refresh,
}

/// Bounds for one `get_table_rows` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub direction: Direction,
    pub lower_bound: Option<String>,
    pub upper_bound: Option<String>,
    pub reverse: bool,
}

impl PageRequest {
    fn ranged(direction: Direction, upper_bound: Option<String>) -> Self {
        Self {
            direction,
            lower_bound: None,
            upper_bound,
            reverse: true,
        }
    }

    fn lookup(key: &str) -> Self {
        Self {
            direction: Direction::Lookup,
            lower_bound: Some(key.to_string()),
            upper_bound: Some(key.to_string()),
            reverse: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pager {
    /// Upper bound each visited page was fetched with; `None` is the head
    stack: Vec<Option<String>>,
    next_key: Option<String>,
    has_more: bool,
    lookup: Option<String>,
}

impl Pager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Zero-based index of the page on screen
    pub fn page_index(&self) -> usize {
        self.stack.len().saturating_sub(1)
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn can_go_back(&self) -> bool {
        self.lookup.is_none() && self.stack.len() > 1
    }

    pub fn lookup_key(&self) -> Option<&str> {
        self.lookup.as_deref()
    }

    pub fn next_key(&self) -> Option<&str> {
        self.next_key.as_deref()
    }

    /// Enter lookup mode; the next `Initial` plan fetches only `key`
    pub fn begin_lookup(&mut self, key: &str) {
        self.reset();
        self.lookup = Some(key.to_string());
    }

    pub fn clear_lookup(&mut self) {
        self.reset();
    }

    /// Bounds for moving in `direction`, or `None` when the move is not possible
    pub fn plan(&self, direction: Direction) -> Option<PageRequest> {
        match direction {
            Direction::Initial => Some(match &self.lookup {
                Some(key) => PageRequest::lookup(key),
                None => PageRequest::ranged(Direction::Initial, None),
            }),
            Direction::Lookup => self.lookup.as_deref().map(PageRequest::lookup),
            Direction::Forward | Direction::Append => {
                if self.lookup.is_some() || !self.has_more {
                    return None;
                }
                let key = self.next_key.clone()?;
                Some(PageRequest::ranged(direction, Some(key)))
            }
            Direction::Backward => {
                if !self.can_go_back() {
                    return None;
                }
                let previous = self.stack[self.stack.len() - 2].clone();
                Some(PageRequest::ranged(Direction::Backward, previous))
            }
            Direction::Refresh => Some(match &self.lookup {
                Some(key) => PageRequest::lookup(key),
                None => PageRequest::ranged(
                    Direction::Refresh,
                    self.stack.last().cloned().flatten(),
                ),
            }),
        }
    }

    /// Record that `request` completed with the given continuation
    pub fn commit(&mut self, request: &PageRequest, next_key: &str, has_more: bool) {
        match request.direction {
            Direction::Initial | Direction::Lookup => {
                self.stack = vec![request.upper_bound.clone().filter(|_| self.lookup.is_none())];
            }
            Direction::Forward => self.stack.push(request.upper_bound.clone()),
            Direction::Backward => {
                self.stack.pop();
            }
            Direction::Append | Direction::Refresh => {
                if self.stack.is_empty() {
                    self.stack.push(None);
                }
            }
        }
        if self.lookup.is_some() {
            self.next_key = None;
            self.has_more = false;
        } else {
            self.next_key = Some(next_key.to_string()).filter(|k| !k.is_empty());
            self.has_more = has_more && self.next_key.is_some();
        }
    }
}
