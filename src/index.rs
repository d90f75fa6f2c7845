//! Daily and quarterly filing indices.
//!
//! EDGAR publishes a `master` index per dissemination day and per quarter. Each lists every
//! filing with its CIK, form type, filing date and archive path, which makes the indices the
//! starting point for collecting 13F reports in bulk:
//!
//! ```ignore
//! use edgar13f::{Edgar, EdgarDay, FilingOperations, FilingOptions, IndexOperations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let edgar = Edgar::new("MyApp contact@example.com")?;
//!     let options = FilingOptions::new().with_form_type("13F-HR").with_cik(1000097);
//!     let entries = edgar
//!         .get_filing_list(EdgarDay::new(2018, 2, 12)?, EdgarDay::new(2018, 2, 16)?, Some(options))
//!         .await?;
//!     for entry in entries {
//!         let filing = edgar.get_13f_filing(entry.path()).await?;
//!         println!("{}: {} holdings", entry.company_name, filing.holdings().len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Available index files are discovered through the SEC's `index.json` directory listings,
//! whose timestamps use `MM/DD/YYYY HH:MM:SS AM/PM`.

use super::Edgar;
use super::error::{EdgarError, Result};
use super::options::FilingOptions;
use super::traits::IndexOperations;
use crate::parsing::index::{IndexConfig, IndexEntry, IndexParser, IndexType};
use async_trait::async_trait;
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Weekday};
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;

/// First year EDGAR has indices for.
pub const FIRST_INDEX_YEAR: i32 = 1994;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IndexResponse {
    pub directory: Directory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Directory {
    pub item: Vec<DirectoryItem>,

    /// Directory path relative to the archives root, e.g. `daily-index/2018/QTR1/`.
    pub name: String,

    #[serde(rename = "parent-dir")]
    pub parent_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Dir,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryItem {
    #[serde(rename = "last-modified")]
    #[serde(with = "edgar_date_format")]
    pub last_modified: NaiveDateTime,

    pub name: String,

    #[serde(rename = "type")]
    pub type_: ItemType,

    /// Path relative to the listing's directory.
    pub href: String,

    /// Human-readable size as reported by the SEC, e.g. `"12 KB"`.
    pub size: String,
}

mod edgar_date_format {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }

    pub fn serialize<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }
}

/// Calendar quarter; index directories are named `QTR1` through `QTR4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quarter {
    Q1 = 1,
    Q2 = 2,
    Q3 = 3,
    Q4 = 4,
}

impl Quarter {
    /// Maps months 1-3 to Q1, 4-6 to Q2, 7-9 to Q3 and 10-12 to Q4.
    ///
    /// # Errors
    ///
    /// `EdgarError::InvalidMonth` outside 1-12.
    pub fn from_month(month: u32) -> Result<Self> {
        match month {
            1..=3 => Ok(Quarter::Q1),
            4..=6 => Ok(Quarter::Q2),
            7..=9 => Ok(Quarter::Q3),
            10..=12 => Ok(Quarter::Q4),
            _ => Err(EdgarError::InvalidMonth),
        }
    }

    pub fn as_i32(&self) -> i32 {
        *self as i32
    }
}

/// A dissemination day, used to locate `daily-index/<YEAR>/QTR<n>/master.<YYYYMMDD>.idx`.
///
/// ```rust
/// use edgar13f::{EdgarDay, Quarter, Result};
///
/// fn main() -> Result<()> {
///     let day = EdgarDay::new(2018, 2, 14)?;
///     assert_eq!(day.format_date(), "20180214");
///     assert_eq!(day.quarter(), Quarter::Q1);
///     assert!(day.is_weekday());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EdgarDay {
    date: NaiveDate,
}

impl EdgarDay {
    /// # Errors
    ///
    /// * `InvalidYear` before 1994.
    /// * `InvalidMonth` outside 1-12.
    /// * `InvalidDay` for a day the month does not have.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        if year < FIRST_INDEX_YEAR {
            return Err(EdgarError::InvalidYear);
        }
        if !(1..=12).contains(&month) {
            return Err(EdgarError::InvalidMonth);
        }
        NaiveDate::from_ymd_opt(year, month, day)
            .map(|date| Self { date })
            .ok_or(EdgarError::InvalidDay)
    }

    /// # Errors
    ///
    /// `InvalidYear` before 1994.
    pub fn from_date(date: NaiveDate) -> Result<Self> {
        if date.year() < FIRST_INDEX_YEAR {
            return Err(EdgarError::InvalidYear);
        }
        Ok(Self { date })
    }

    /// `YYYYMMDD`, as used in daily index file names.
    pub fn format_date(&self) -> String {
        self.date.format("%Y%m%d").to_string()
    }

    pub fn quarter(&self) -> Quarter {
        match self.date.month0() / 3 {
            0 => Quarter::Q1,
            1 => Quarter::Q2,
            2 => Quarter::Q3,
            _ => Quarter::Q4,
        }
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The SEC disseminates filings Monday through Friday only.
    pub fn is_weekday(&self) -> bool {
        !matches!(self.date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    pub fn period(&self) -> EdgarPeriod {
        EdgarPeriod {
            year: self.year(),
            quarter: self.quarter(),
        }
    }

    fn succ(&self) -> Option<Self> {
        self.date.checked_add_days(Days::new(1)).map(|date| Self { date })
    }
}

/// A year and quarter, used to locate `<daily|full>-index/<YEAR>/QTR<n>/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgarPeriod {
    year: i32,
    quarter: Quarter,
}

impl EdgarPeriod {
    /// # Errors
    ///
    /// `InvalidYear` before 1994.
    pub fn new(year: i32, quarter: Quarter) -> Result<Self> {
        if year < FIRST_INDEX_YEAR {
            return Err(EdgarError::InvalidYear);
        }
        Ok(Self { year, quarter })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn quarter(&self) -> Quarter {
        self.quarter
    }
}

/// Which flavor of index a listing is searched for.
#[derive(Debug, Clone, Copy)]
enum IndexKind {
    Daily(EdgarDay),
    Full,
}

impl IndexKind {
    fn directory(&self) -> &'static str {
        match self {
            IndexKind::Daily(_) => "daily",
            IndexKind::Full => "full",
        }
    }
}

impl Edgar {
    fn decode_index(content: Vec<u8>, file_name: &str) -> Result<String> {
        if file_name.ends_with(".gz") {
            let mut decoder = GzDecoder::new(&content[..]);
            let mut result = String::new();
            decoder.read_to_string(&mut result)?;
            Ok(result)
        } else {
            Ok(String::from_utf8(content)?)
        }
    }

    /// Picks the master index file from a listing, preferring gzipped copies.
    fn find_index_file(items: &[DirectoryItem], kind: IndexKind) -> Option<&DirectoryItem> {
        let base = match kind {
            IndexKind::Daily(day) => format!("{}.{}", IndexType::Master.as_str(), day.format_date()),
            IndexKind::Full => IndexType::Master.as_str().to_string(),
        };
        ["gz", "idx.gz", "idx"].iter().find_map(|ext| {
            let name = format!("{}.{}", base, ext);
            items
                .iter()
                .find(|item| item.name == name && item.type_ == ItemType::File)
        })
    }

    /// `{archives}/{daily|full}-index[/{YEAR}/QTR{q}]/index.json`.
    fn index_listing_url(&self, directory: &str, period: Option<EdgarPeriod>) -> String {
        match period {
            Some(p) => format!(
                "{}/{}-index/{}/QTR{}/index.json",
                self.edgar_archives_url,
                directory,
                p.year(),
                p.quarter().as_i32()
            ),
            None => format!("{}/{}-index/index.json", self.edgar_archives_url, directory),
        }
    }

    async fn fetch_index(&self, directory: &str, period: Option<EdgarPeriod>) -> Result<IndexResponse> {
        let url = self.index_listing_url(directory, period);
        tracing::debug!("Fetching index listing {}", url);
        let response = self.get(&url).await?;
        Ok(serde_json::from_str(&response)?)
    }

    /// Downloads and parses the master index named in `listing`.
    ///
    /// # Errors
    ///
    /// `EdgarError::NotFound` when the listing has no matching master file.
    async fn fetch_master_index(
        &self,
        listing: &IndexResponse,
        period: EdgarPeriod,
        kind: IndexKind,
    ) -> Result<Vec<IndexEntry>> {
        let file = Self::find_index_file(&listing.directory.item, kind).ok_or(EdgarError::NotFound)?;
        let url = format!(
            "{}/{}-index/{}/QTR{}/{}",
            self.edgar_archives_url,
            kind.directory(),
            period.year(),
            period.quarter().as_i32(),
            file.href
        );

        let content = Self::decode_index(self.get_bytes(&url).await?, &file.name)?;
        let parser = IndexParser::new(IndexConfig {
            index_type: Some(IndexType::Master),
            ..Default::default()
        });
        let entries = parser.parse(content.as_bytes())?;
        tracing::debug!("Parsed {} entries from {}", entries.len(), url);
        Ok(entries)
    }
}

fn filtered(entries: Vec<IndexEntry>, options: Option<&FilingOptions>) -> Vec<IndexEntry> {
    match options {
        Some(opts) => opts.apply(entries),
        None => entries,
    }
}

#[async_trait]
impl IndexOperations for Edgar {
    /// # Errors
    ///
    /// * `EdgarError::NotFound` if the quarter has no listing or the day has no master file.
    /// * `EdgarError::RequestError` for network issues.
    async fn get_daily_filings(
        &self,
        day: EdgarDay,
        options: Option<FilingOptions>,
    ) -> Result<Vec<IndexEntry>> {
        let listing = self.fetch_index("daily", Some(day.period())).await?;
        let entries = self
            .fetch_master_index(&listing, day.period(), IndexKind::Daily(day))
            .await?;
        Ok(filtered(entries, options.as_ref()))
    }

    async fn get_period_filings(
        &self,
        period: EdgarPeriod,
        options: Option<FilingOptions>,
    ) -> Result<Vec<IndexEntry>> {
        let listing = self.fetch_index("full", Some(period)).await?;
        let entries = self
            .fetch_master_index(&listing, period, IndexKind::Full)
            .await?;
        Ok(filtered(entries, options.as_ref()))
    }

    /// Walks the range one day at a time. Each quarter's listing is fetched once. Weekends,
    /// holidays and days the SEC has no master file for are skipped. Form type and CIK filters
    /// apply per day; offset and limit apply to the combined list.
    ///
    /// # Errors
    ///
    /// * `EdgarError::InvalidDateRange` if `end` is before `start`.
    /// * Any retrieval error other than `NotFound`.
    async fn get_filing_list(
        &self,
        start: EdgarDay,
        end: EdgarDay,
        options: Option<FilingOptions>,
    ) -> Result<Vec<IndexEntry>> {
        if end < start {
            return Err(EdgarError::InvalidDateRange(format!(
                "{} is after {}",
                start.format_date(),
                end.format_date()
            )));
        }

        let mut listings: HashMap<EdgarPeriod, Option<IndexResponse>> = HashMap::new();
        let mut entries = Vec::new();
        let mut day = Some(start);

        while let Some(current) = day.filter(|d| *d <= end) {
            day = current.succ();
            if !current.is_weekday() {
                continue;
            }

            let period = current.period();
            if !listings.contains_key(&period) {
                let listing = match self.fetch_index("daily", Some(period)).await {
                    Ok(listing) => Some(listing),
                    Err(EdgarError::NotFound) => None,
                    Err(e) => return Err(e),
                };
                listings.insert(period, listing);
            }
            let Some(Some(listing)) = listings.get(&period) else {
                continue;
            };

            match self
                .fetch_master_index(listing, period, IndexKind::Daily(current))
                .await
            {
                Ok(day_entries) => {
                    let before = entries.len();
                    entries.extend(day_entries.into_iter().filter(|entry| {
                        options.as_ref().is_none_or(|opts| opts.matches(entry))
                    }));
                    tracing::debug!(
                        "{}: {} matching filings",
                        current.format_date(),
                        entries.len() - before
                    );
                }
                Err(EdgarError::NotFound) => {
                    tracing::debug!("No daily index for {}", current.format_date());
                }
                Err(e) => return Err(e),
            }
        }

        let entries = match options {
            Some(opts) => entries
                .into_iter()
                .skip(opts.offset.unwrap_or(0))
                .take(opts.limit.unwrap_or(usize::MAX))
                .collect(),
            None => entries,
        };
        Ok(entries)
    }

    async fn daily_index(&self, period: Option<EdgarPeriod>) -> Result<IndexResponse> {
        self.fetch_index("daily", period).await
    }

    async fn full_index(&self, period: Option<EdgarPeriod>) -> Result<IndexResponse> {
        self.fetch_index("full", period).await
    }
}
