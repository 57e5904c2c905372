//! Data sources: materialized record lists and paged query handles.

use std::cell::Cell;
use std::fmt;

use log::debug;

use crate::error::{ExportError, Result};

/// Query handle the pipeline can only fetch from, never iterate directly.
pub trait QuerySource<R> {
    /// Fetch every matching record eagerly.
    fn fetch_all(&self) -> Result<Vec<R>>;

    /// Fetch up to `n_limit` records starting at `n_offset`.
    fn fetch_page(&self, n_offset: usize, n_limit: usize) -> Result<Vec<R>>;

    /// Fetch successive pages of `n_size_page` records, invoking `callback` per page.
    ///
    /// Stops after the first page shorter than `n_size_page`; an empty page is
    /// not handed to `callback`. Returns the number of fetch calls issued.
    fn for_each_page(
        &self,
        n_size_page: usize,
        callback: &mut dyn FnMut(Vec<R>) -> Result<()>,
    ) -> Result<usize> {
        if n_size_page == 0 {
            return Err(ExportError::Configuration(
                "Page size must be >= 1.".to_string(),
            ));
        }

        let mut n_offset = 0usize;
        let mut n_fetches = 0usize;
        loop {
            let l_page = self.fetch_page(n_offset, n_size_page)?;
            n_fetches += 1;
            let n_len_page = l_page.len();
            debug!("fetched page #{n_fetches}: offset={n_offset} len={n_len_page}");

            if n_len_page > 0 {
                callback(l_page)?;
            }
            if n_len_page < n_size_page {
                return Ok(n_fetches);
            }
            n_offset += n_len_page;
        }
    }
}

/// Where records come from for one pipeline. Last configuration wins.
pub enum EnumDataSource<R> {
    /// Ordered, already-available records.
    Materialized(Vec<R>),
    /// Query fetched eagerly or page by page.
    Queryable(Box<dyn QuerySource<R>>),
}

impl<R> EnumDataSource<R> {
    /// Variant label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Materialized(_) => "materialized",
            Self::Queryable(_) => "queryable",
        }
    }
}

impl<R> fmt::Debug for EnumDataSource<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Materialized(l_records) => f
                .debug_tuple("Materialized")
                .field(&l_records.len())
                .finish(),
            Self::Queryable(_) => f.write_str("Queryable(..)"),
        }
    }
}

/// In-memory query over a record vector.
///
/// Counts fetch calls so callers can observe paging behaviour.
#[derive(Debug, Clone)]
pub struct VecQuery<R> {
    l_records: Vec<R>,
    n_fetches: Cell<usize>,
}

impl<R: Clone> VecQuery<R> {
    /// Wrap records as a query result set.
    pub fn new(l_records: Vec<R>) -> Self {
        Self {
            l_records,
            n_fetches: Cell::new(0),
        }
    }

    /// Fetch calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.n_fetches.get()
    }

    /// Total records in the result set.
    pub fn len(&self) -> usize {
        self.l_records.len()
    }

    /// Whether the result set is empty.
    pub fn is_empty(&self) -> bool {
        self.l_records.is_empty()
    }
}

impl<R: Clone> QuerySource<R> for VecQuery<R> {
    fn fetch_all(&self) -> Result<Vec<R>> {
        self.n_fetches.set(self.n_fetches.get() + 1);
        Ok(self.l_records.clone())
    }

    fn fetch_page(&self, n_offset: usize, n_limit: usize) -> Result<Vec<R>> {
        self.n_fetches.set(self.n_fetches.get() + 1);
        let n_start = usize::min(n_offset, self.l_records.len());
        let n_end = usize::min(n_start.saturating_add(n_limit), self.l_records.len());
        Ok(self.l_records[n_start..n_end].to_vec())
    }
}

impl<R, Q: QuerySource<R> + ?Sized> QuerySource<R> for std::rc::Rc<Q> {
    fn fetch_all(&self) -> Result<Vec<R>> {
        (**self).fetch_all()
    }

    fn fetch_page(&self, n_offset: usize, n_limit: usize) -> Result<Vec<R>> {
        (**self).fetch_page(n_offset, n_limit)
    }

    fn for_each_page(
        &self,
        n_size_page: usize,
        callback: &mut dyn FnMut(Vec<R>) -> Result<()>,
    ) -> Result<usize> {
        (**self).for_each_page(n_size_page, callback)
    }
}
