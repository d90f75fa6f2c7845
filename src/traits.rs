//! Operations the [`Edgar`](crate::Edgar) client offers, grouped by feature.

use super::error::Result;
#[cfg(feature = "index")]
use super::index::{EdgarDay, EdgarPeriod, IndexResponse};
#[cfg(feature = "index")]
use super::options::FilingOptions;
#[cfg(feature = "filings")]
use super::parsing::{filing::Filing, thirteenf::Filing13F};
#[cfg(feature = "index")]
use super::parsing::index::IndexEntry;
use async_trait::async_trait;

/// Retrieval of full submission text files from the archives.
///
/// Paths are the `Filename` column of an index file, e.g.
/// `edgar/data/1000097/0000919574-18-001804.txt`.
#[cfg(feature = "filings")]
#[async_trait]
pub trait FilingOperations {
    /// Absolute URL of a submission.
    fn filing_url(&self, path: &str) -> String;
    /// Downloads the raw submission text.
    async fn get_filing_text(&self, path: &str) -> Result<String>;
    /// Downloads and splits a submission.
    async fn get_filing(&self, path: &str) -> Result<Filing>;
    /// Downloads a 13F submission and runs metadata and holdings extraction on it.
    async fn get_13f_filing(&self, path: &str) -> Result<Filing13F>;
}

/// Daily and quarterly filing indices, available from 1994 on.
#[cfg(feature = "index")]
#[async_trait]
pub trait IndexOperations {
    /// Directory listing of the quarterly (full) indices.
    async fn full_index(&self, period: Option<EdgarPeriod>) -> Result<IndexResponse>;
    /// Directory listing of the daily indices.
    async fn daily_index(&self, period: Option<EdgarPeriod>) -> Result<IndexResponse>;
    /// Filings disseminated on one day, from `master.YYYYMMDD.idx`.
    async fn get_daily_filings(
        &self,
        day: EdgarDay,
        options: Option<FilingOptions>,
    ) -> Result<Vec<IndexEntry>>;
    /// Filings of a whole quarter, from `master.idx`.
    async fn get_period_filings(
        &self,
        period: EdgarPeriod,
        options: Option<FilingOptions>,
    ) -> Result<Vec<IndexEntry>>;
    /// Filings disseminated on the weekdays from `start` through `end`, days without an
    /// index skipped.
    async fn get_filing_list(
        &self,
        start: EdgarDay,
        end: EdgarDay,
        options: Option<FilingOptions>,
    ) -> Result<Vec<IndexEntry>>;
}
