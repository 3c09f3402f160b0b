// src/pipeline/scan.rs

//! The candidate stream a source adapter produces.

use std::iter::{Enumerate, FusedIterator};
use std::vec::IntoIter;

use scraper::ElementRef;

use crate::models::{CandidateGroup, OriginRef};

/// One element of a source scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanItem {
    /// Number of rows the scan will visit; always the first item.
    Progress { total: usize },
    /// A row excluded from consideration. The consumer may hide it.
    Skip(OriginRef),
    /// A group ready for reconciliation.
    Candidate(CandidateGroup),
}

/// Lazy, single-pass scan over the rows of a page.
///
/// Rows are collected up front so the total can be announced, but each
/// row is only parsed when the consumer asks for the next item. Dropping
/// the scan stops it; nothing needs cleaning up.
pub struct CandidateScan<'a, T = ElementRef<'a>> {
    total: Option<usize>,
    rows: Enumerate<IntoIter<T>>,
    parse_row: Box<dyn FnMut(usize, T) -> ScanItem + 'a>,
}

impl<'a, T> CandidateScan<'a, T> {
    /// Create a scan that parses each row with `parse_row(index, row)`.
    pub fn new(rows: Vec<T>, parse_row: impl FnMut(usize, T) -> ScanItem + 'a) -> Self {
        Self {
            total: Some(rows.len()),
            rows: rows.into_iter().enumerate(),
            parse_row: Box::new(parse_row),
        }
    }
}

impl<T> Iterator for CandidateScan<'_, T> {
    type Item = ScanItem;

    fn next(&mut self) -> Option<ScanItem> {
        if let Some(total) = self.total.take() {
            return Some(ScanItem::Progress { total });
        }
        let (index, row) = self.rows.next()?;
        Some((self.parse_row)(index, row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.rows.len() + usize::from(self.total.is_some());
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for CandidateScan<'_, T> {}

impl<T> FusedIterator for CandidateScan<'_, T> {}

/// Origin handle for the `index`-th row of a site's page.
pub fn row_origin(site: &str, index: usize) -> OriginRef {
    OriginRef::new(format!("{site}#{index}"))
}

/// Origin handle for one release inside a multi-release row.
pub fn release_origin(site: &str, index: usize, release: usize) -> OriginRef {
    OriginRef::new(format!("{site}#{index}/{release}"))
}
