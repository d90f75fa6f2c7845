//! Retrieval of full submission text files.
//!
//! Every filing in the archives has a complete submission text file holding the SEC header and
//! all documents, at the path an index file lists for it. These operations download that file
//! and hand it to the parsers in [`crate::parsing`].

use super::Edgar;
use super::error::Result;
use super::traits::FilingOperations;
use crate::parsing::filing::Filing;
use crate::parsing::thirteenf::Filing13F;
use async_trait::async_trait;

/// Index paths are relative to `Archives/`, the client's root is `Archives/edgar`.
const EDGAR_PREFIX: &str = "edgar/";

#[async_trait]
impl FilingOperations for Edgar {
    /// Resolves an index path to an absolute URL. Absolute URLs are returned unchanged.
    ///
    /// ```rust
    /// # use edgar13f::{Edgar, FilingOperations};
    /// let edgar = Edgar::new("my_app/1.0 (my@email.com)")?;
    /// assert_eq!(
    ///     edgar.filing_url("edgar/data/7789/0000007789-19-000010.txt"),
    ///     "https://www.sec.gov/Archives/edgar/data/7789/0000007789-19-000010.txt"
    /// );
    /// # Ok::<(), edgar13f::EdgarError>(())
    /// ```
    fn filing_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let path = path.trim_start_matches('/');
        let path = path.strip_prefix(EDGAR_PREFIX).unwrap_or(path);
        format!("{}/{}", self.edgar_archives_url, path)
    }

    /// # Errors
    ///
    /// * `EdgarError::NotFound` if the archive has no such file.
    /// * `EdgarError::RequestError` for network issues.
    async fn get_filing_text(&self, path: &str) -> Result<String> {
        let url = self.filing_url(path);
        tracing::debug!("Fetching filing {}", url);
        self.get(&url).await
    }

    async fn get_filing(&self, path: &str) -> Result<Filing> {
        let text = self.get_filing_text(path).await?;
        Ok(Filing::new(&text))
    }

    /// The returned filing is always processed; check [`Filing13F::metadata`] and
    /// [`Filing13F::holdings`] for what could be extracted.
    async fn get_13f_filing(&self, path: &str) -> Result<Filing13F> {
        let mut filing = Filing13F::from(self.get_filing(path).await?);
        if !filing.process() {
            tracing::warn!("Incomplete 13F extraction for {}", path);
        }
        Ok(filing)
    }
}
