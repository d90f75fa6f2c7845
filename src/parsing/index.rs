//! EDGAR index file parsing.
//!
//! Daily and quarterly index files list one filing per line after a short preamble:
//!
//! ```text
//! Description:           Master Index of EDGAR Dissemination Feed
//! Last Data Received:    January 2, 2018
//! Comments:              webmaster@sec.gov
//! Anonymous FTP:         ftp://ftp.sec.gov/edgar/
//! Cloud HTTP:            https://www.sec.gov/Archives/
//!
//! CIK|Company Name|Form Type|Date Filed|Filename
//! --------------------------------------------------------------------------------
//! 1000097|KINGDON CAPITAL MANAGEMENT, L.L.C.|13F-HR|2018-02-14|edgar/data/1000097/0000919574-18-001804.txt
//! ```
//!
//! Older master files omit the `Cloud HTTP` line and spell the last column `File Name`; both
//! layouts are handled by skipping everything up to the dashed line.

use crate::Result;
use serde::{Deserialize, Deserializer, Serialize, de::Error};
use std::io::BufRead;
use std::str::FromStr;

/// Configuration for [`IndexParser`].
#[derive(Debug, Clone, Default)]
pub struct IndexConfig {
    /// Column widths for fixed-width layouts, overriding the defaults.
    pub field_widths: Option<Vec<usize>>,
    /// Column delimiter, overriding the index type's own.
    pub delimiter: Option<char>,
    pub max_entries: Option<usize>,
    /// Index layout; detected from the preamble when `None`.
    pub index_type: Option<IndexType>,
}

/// One filing listed in an index file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub company_name: String,
    pub form_type: String,
    #[serde(deserialize_with = "deserialize_str_to_u64")]
    pub cik: u64,
    pub date_filed: String,
    /// Absolute URL of the full submission text.
    pub url: String,
}

impl IndexEntry {
    /// Path of the submission relative to the archives root, e.g.
    /// `edgar/data/1000097/0000919574-18-001804.txt`.
    pub fn path(&self) -> &str {
        self.url
            .strip_prefix(IndexParser::ARCHIVES_PREFIX)
            .unwrap_or(&self.url)
    }

    /// Accession number taken from the submission file name.
    pub fn accession_number(&self) -> Option<&str> {
        self.url
            .rsplit('/')
            .next()
            .and_then(|name| name.strip_suffix(".txt"))
            .filter(|name| !name.is_empty())
    }
}

/// Deserializes a string such as `"0000320193"` into a u64.
fn deserialize_str_to_u64<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    u64::from_str(s.trim()).map_err(Error::custom)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexType {
    Company,
    Crawler,
    /// `|`-delimited; the layout the SEC keeps stable across years.
    #[default]
    Master,
}

impl IndexType {
    pub const VARIANTS: &'static [(&'static str, IndexType)] = &[
        ("company", IndexType::Company),
        ("crawler", IndexType::Crawler),
        ("master", IndexType::Master),
    ];

    /// File name prefix used in index directories (`master.20180102.idx`).
    pub fn as_str(&self) -> &'static str {
        Self::VARIANTS
            .iter()
            .find(|(_, variant)| variant == self)
            .map(|(s, _)| *s)
            .unwrap_or("master")
    }
}

impl FromStr for IndexType {
    type Err = crate::EdgarError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_lowercase();
        Self::VARIANTS
            .iter()
            .find(|(pattern, _)| lower.contains(pattern))
            .map(|(_, variant)| *variant)
            .ok_or_else(|| crate::EdgarError::InvalidFormat(format!("Unknown index type: {}", s)))
    }
}

/// Parser for EDGAR company, crawler and master index files.
///
/// ```
/// use edgar13f::parsing::index::{IndexConfig, IndexParser};
///
/// let content = "Description: Master Index of EDGAR Dissemination Feed\n\
/// CIK|Company Name|Form Type|Date Filed|Filename\n\
/// ----------------------------------------------------\n\
/// 2230|ADAMS EXPRESS CO|13F-HR|2000-02-15|edgar/data/2230/0000002230-00-000003.txt\n";
/// let entries = IndexParser::new(IndexConfig::default()).parse(content.as_bytes()).unwrap();
/// assert_eq!(entries[0].cik, 2230);
/// assert_eq!(entries[0].accession_number(), Some("0000002230-00-000003"));
/// ```
pub struct IndexParser {
    config: IndexConfig,
}

impl IndexParser {
    pub const ARCHIVES_PREFIX: &'static str = "https://www.sec.gov/Archives/";

    const PREAMBLE_LINES: usize = 10;
    const MAX_HEADER_LINES: usize = 50;
    const FIXED_WIDTHS: [usize; 5] = [62, 12, 12, 12, 74];

    pub fn new(config: IndexConfig) -> Self {
        Self { config }
    }

    /// Guesses the index layout from the preamble. Unrecognized files are read as crawler
    /// indices.
    fn detect_type<R: BufRead>(&self, reader: &mut R) -> Result<IndexType> {
        for line in reader.lines().take(Self::PREAMBLE_LINES) {
            let line = line?;
            if line.contains("Daily Index of EDGAR Dissemination Feed by Company Name") {
                return Ok(IndexType::Company);
            }
            if line.contains("Daily Crawler Index") {
                return Ok(IndexType::Crawler);
            }
            if line.contains("Master Index") || line.contains("XBRL Index") {
                return Ok(IndexType::Master);
            }
        }
        Ok(IndexType::Crawler)
    }

    /// Consumes lines up to and including the dashed line under the column names.
    fn skip_header_lines<R: BufRead>(&self, reader: &mut R) -> Result<()> {
        for line in reader.lines().take(Self::MAX_HEADER_LINES) {
            if line?.contains("---") {
                break;
            }
        }
        Ok(())
    }

    /// Parses all entries of an index file.
    ///
    /// # Errors
    ///
    /// * `EdgarError::FileError` if reading fails.
    /// * `EdgarError::InvalidFormat` for a row whose CIK is not numeric.
    pub fn parse<R: BufRead>(&self, mut reader: R) -> Result<Vec<IndexEntry>> {
        let index_type = match self.config.index_type {
            Some(t) => t,
            None => self.detect_type(&mut reader)?,
        };
        self.skip_header_lines(&mut reader)?;

        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.starts_with("---") {
                continue;
            }
            if let Some(entry) = self.parse_line(&line, index_type)? {
                entries.push(entry);
                if self.config.max_entries.is_some_and(|max| entries.len() >= max) {
                    break;
                }
            }
        }

        Ok(entries)
    }

    /// Parses one row, returning `None` for blank or short lines.
    fn parse_line(&self, line: &str, index_type: IndexType) -> Result<Option<IndexEntry>> {
        if line.trim().is_empty() {
            return Ok(None);
        }

        let fields: Vec<String> = match (&self.config.field_widths, self.config.delimiter) {
            (Some(widths), _) => Self::parse_fixed_width(line, widths),
            (None, Some(delimiter)) => split_trimmed(line, delimiter),
            (None, None) => match index_type {
                IndexType::Company | IndexType::Crawler => {
                    Self::parse_fixed_width(line, &Self::FIXED_WIDTHS)
                }
                IndexType::Master => split_trimmed(line, '|'),
            },
        };

        if fields.len() < 4 {
            return Ok(None);
        }

        let archived = |path: Option<&String>| {
            path.map(|p| format!("{}{}", Self::ARCHIVES_PREFIX, p))
        };
        let (company_name, form_type, cik, date_filed, url) = match index_type {
            IndexType::Company => (&fields[0], &fields[1], &fields[2], &fields[3], archived(fields.get(4))),
            IndexType::Crawler => (&fields[0], &fields[1], &fields[2], &fields[3], fields.get(4).cloned()),
            IndexType::Master => (&fields[1], &fields[2], &fields[0], &fields[3], archived(fields.get(4))),
        };

        let cik = cik
            .parse::<u64>()
            .map_err(|_| crate::EdgarError::InvalidFormat(format!("Invalid CIK: {}", cik)))?;

        Ok(Some(IndexEntry {
            company_name: company_name.clone(),
            form_type: form_type.clone(),
            cik,
            date_filed: date_filed.clone(),
            url: url.unwrap_or_default(),
        }))
    }

    /// Cuts a line into consecutive fixed-width fields; any overflow becomes a final field.
    fn parse_fixed_width(line: &str, widths: &[usize]) -> Vec<String> {
        let chars: Vec<char> = line.chars().collect();
        let mut result = Vec::with_capacity(widths.len() + 1);
        let mut start = 0;

        for &width in widths {
            if start >= chars.len() {
                break;
            }
            let end = (start + width).min(chars.len());
            result.push(chars[start..end].iter().collect::<String>().trim().to_string());
            start = end;
        }
        if start < chars.len() {
            result.push(chars[start..].iter().collect::<String>().trim().to_string());
        }
        result
    }
}

fn split_trimmed(line: &str, delimiter: char) -> Vec<String> {
    line.split(delimiter).map(|s| s.trim().to_string()).collect()
}
