//! Stitches `limit`/`offset` pages into one lazy sequence of records.
//!
//! The operation is called with a [`PageRequest`] for each page; anything else
//! it needs (a group id, a filter) is captured by the closure and therefore
//! identical on every call. Each page reports the total record count, and the
//! sequence ends once the pages cover it or a page comes back empty. An error
//! is yielded once, at the page where it happened, and ends the sequence. No
//! page is fetched before the consumer asks for its first record.

use std::vec;

use futures::{
  TryStreamExt,
  stream::{self, StreamExt},
};
use futures_core::Stream;
use serde::{Deserialize, Serialize};
use tracing::{error, trace};

pub const DEFAULT_LIMIT: u64 = 10;

/// Page size and starting offset of a paginated read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOptions {
  pub limit: u64,
  pub offset: u64,
}

impl Default for PageOptions {
  fn default() -> Self {
    Self {
      limit: DEFAULT_LIMIT,
      offset: 0,
    }
  }
}

impl PageOptions {
  pub fn with_limit(limit: u64) -> Self {
    Self {
      limit,
      ..Self::default()
    }
  }
}

/// Arguments of a single page call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
  pub limit: u64,
  pub offset: u64,
}

impl PageRequest {
  /// `limit` and `offset` as query parameters.
  pub fn query_pairs(&self) -> [(&'static str, String); 2] {
    [("limit", self.limit.to_string()), ("offset", self.offset.to_string())]
  }
}

/// One page of a paged response.
pub trait Paged {
  type Item;

  fn total_count(&self) -> u64;

  fn into_data(self) -> Vec<Self::Item>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
  #[serde(alias = "total_count")]
  pub count: u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub limit: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub offset: Option<u64>,
}

/// `{ "meta": { "count": .. }, "data": [..] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedResult<T> {
  pub meta: PaginationMeta,
  pub data: Vec<T>,
}

impl<T> Paged for PagedResult<T> {
  type Item = T;

  fn total_count(&self) -> u64 {
    self.meta.count
  }

  fn into_data(self) -> Vec<T> {
    self.data
  }
}

/// Reusable description of a paginated read; see [`paginate`].
#[derive(Debug, Clone)]
pub struct Pages<F> {
  operation: F,
  options: PageOptions,
}

/// Lazily reads every record of a paged operation.
///
/// A zero `limit` is raised to one.
pub fn paginate<F, P, E>(operation: F, options: PageOptions) -> Pages<F>
where
  F: Fn(PageRequest) -> Result<P, E>,
  P: Paged,
{
  Pages {
    operation,
    options: PageOptions {
      limit: options.limit.max(1),
      ..options
    },
  }
}

impl<F, P, E> Pages<F>
where
  F: Fn(PageRequest) -> Result<P, E>,
  P: Paged,
{
  /// Starts a fresh pass from the initial offset.
  pub fn iter(&self) -> PageIter<'_, F, P::Item> {
    PageIter {
      operation: &self.operation,
      limit: self.options.limit,
      offset: self.options.offset,
      buffer: Vec::new().into_iter(),
      done: false,
    }
  }
}

impl<'a, F, P, E> IntoIterator for &'a Pages<F>
where
  F: Fn(PageRequest) -> Result<P, E>,
  P: Paged,
{
  type Item = Result<P::Item, E>;
  type IntoIter = PageIter<'a, F, P::Item>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

/// One pass over the records of [`Pages`].
pub struct PageIter<'a, F, T> {
  operation: &'a F,
  limit: u64,
  offset: u64,
  buffer: vec::IntoIter<T>,
  done: bool,
}

impl<F, P, E, T> Iterator for PageIter<'_, F, T>
where
  F: Fn(PageRequest) -> Result<P, E>,
  P: Paged<Item = T>,
{
  type Item = Result<T, E>;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      if let Some(record) = self.buffer.next() {
        return Some(Ok(record));
      }
      if self.done {
        return None;
      }

      let request = PageRequest {
        limit: self.limit,
        offset: self.offset,
      };
      trace!(limit = request.limit, offset = request.offset, "fetching page");
      match (self.operation)(request) {
        Ok(page) => {
          let total = page.total_count();
          let data = page.into_data();
          self.offset = self.offset.saturating_add(self.limit);
          self.done = data.is_empty() || self.offset >= total;
          self.buffer = data.into_iter();
        }
        Err(err) => {
          error!(limit = request.limit, offset = request.offset, "page request failed");
          self.done = true;
          return Some(Err(err));
        }
      }
    }
  }
}

struct StreamState<F> {
  operation: F,
  limit: u64,
  offset: u64,
  done: bool,
}

/// Async counterpart of [`paginate`] for operations returning futures.
pub fn paginate_stream<F, Fut, P, E>(operation: F, options: PageOptions) -> impl Stream<Item = Result<P::Item, E>>
where
  F: FnMut(PageRequest) -> Fut,
  Fut: Future<Output = Result<P, E>>,
  P: Paged,
{
  let state = StreamState {
    operation,
    limit: options.limit.max(1),
    offset: options.offset,
    done: false,
  };

  stream::try_unfold(state, |mut state| async move {
    if state.done {
      return Ok(None);
    }
    let request = PageRequest {
      limit: state.limit,
      offset: state.offset,
    };
    trace!(limit = request.limit, offset = request.offset, "fetching page");
    let page = match (state.operation)(request).await {
      Ok(page) => page,
      Err(err) => {
        error!(limit = request.limit, offset = request.offset, "page request failed");
        return Err(err);
      }
    };

    let total = page.total_count();
    let data = page.into_data();
    state.offset = state.offset.saturating_add(state.limit);
    state.done = data.is_empty() || state.offset >= total;
    Ok(Some((data, state)))
  })
  .map_ok(|data| stream::iter(data).map(Ok))
  .try_flatten()
}
