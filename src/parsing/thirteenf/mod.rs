//! Form 13F-HR processing.
//!
//! [`Filing13F`] wraps a split [`Filing`] and, once [`Filing13F::process`] has run, carries
//! the filer metadata and the holdings table.
//!
//! Holdings come from one of two places, decided once per filing by [`HoldingsSource`]:
//! the XML `INFORMATION TABLE` document (filings since 2013), or the fixed-width text table
//! typed into the 13F-HR document itself (older filings).
//!
//! # Examples
//!
//! ```ignore
//! use edgar13f::Filing13F;
//!
//! let raw = std::fs::read_to_string("0000919574-18-001804.txt")?;
//! let mut filing = Filing13F::new(&raw);
//! if filing.process() {
//!     for holding in filing.holdings() {
//!         println!("{} {} {}", holding.cusip, holding.name_of_issuer, holding.value);
//!     }
//! }
//! ```

mod holding;
mod metadata;
mod table;

pub use holding::{
    Holding, INFORMATION_TABLE_NAMESPACE, VALUE_MULTIPLIER, is_valid_cusip,
    parse_info_table_entry, parse_information_table,
};
pub use metadata::{
    Address, AddressField, AddressKind, FilerMetadata, HEADER_FIELDS, HeaderField, HeaderParser,
    HeaderSection, XmlHeader, extract_metadata, parse_header, parse_xml_header,
};
pub use table::{
    RowState, TableConfig, TableParser, derive_column_boundaries, parse_number, slice_fields,
};

use super::filing::{Filing, extract_section};
use crate::error::{EdgarError, Result};
use std::ops::Deref;

/// Document types of the 13F holdings report and its amendment.
pub const FORM_TYPES: &[&str] = &["13F-HR", "13F-HR/A"];

/// Document type of the XML holdings table.
pub const INFORMATION_TABLE: &str = "INFORMATION TABLE";

/// Returns the 13F-HR (or 13F-HR/A) document as `(type, body)`.
pub(crate) fn primary_document(filing: &Filing) -> Option<(&'static str, &str)> {
    FORM_TYPES
        .iter()
        .find_map(|form| filing.document(form).map(|body| (*form, body)))
}

/// Where a filing's holdings table lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldingsSource<'a> {
    /// Body of the `INFORMATION TABLE` document.
    XmlTable(&'a str),
    /// Body of the 13F-HR document holding `<TABLE>` sections.
    TextTable(&'a str),
    /// Not a 13F holdings report.
    Absent,
}

impl<'a> HoldingsSource<'a> {
    /// Picks the XML table when present, otherwise the 13F-HR text.
    pub fn detect(filing: &'a Filing) -> Self {
        if let Some(document) = filing.document(INFORMATION_TABLE) {
            return HoldingsSource::XmlTable(document);
        }
        match primary_document(filing) {
            Some((_, document)) => HoldingsSource::TextTable(document),
            None => HoldingsSource::Absent,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, HoldingsSource::Absent)
    }

    /// Extracts the holdings from this source.
    ///
    /// # Errors
    ///
    /// * `EdgarError::MissingElement` if an information table has no `<XML>` body.
    /// * `EdgarError::XmlError` if that body is not well-formed.
    /// * `EdgarError::InvalidTable` if no text table has a usable column layout.
    pub fn extract(&self, config: &TableConfig) -> Result<Vec<Holding>> {
        match self {
            HoldingsSource::XmlTable(document) => {
                let (xml, _) = extract_section(document, "<XML>", "</XML>");
                if xml.is_empty() {
                    return Err(EdgarError::MissingElement(format!("{}/XML", INFORMATION_TABLE)));
                }
                let mut holdings = parse_information_table(xml.trim())?;
                if let Some(max) = config.max_entries {
                    holdings.truncate(max);
                }
                Ok(holdings)
            }
            HoldingsSource::TextTable(document) => {
                TableParser::new(config.clone()).parse(document)
            }
            HoldingsSource::Absent => Ok(Vec::new()),
        }
    }
}

/// Extracts the holdings table of a filing, empty when it is not a 13F report.
pub fn extract_holdings(filing: &Filing) -> Result<Vec<Holding>> {
    HoldingsSource::detect(filing).extract(&TableConfig::default())
}

/// A 13F-HR submission with its extracted metadata and holdings.
#[derive(Debug, Clone, Default)]
pub struct Filing13F {
    filing: Filing,
    config: TableConfig,
    metadata: FilerMetadata,
    holdings: Vec<Holding>,
}

impl Filing13F {
    /// Splits a raw submission. Nothing is extracted until [`Filing13F::process`] runs.
    pub fn new(raw: &str) -> Self {
        Filing::new(raw).into()
    }

    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs metadata then holdings extraction.
    ///
    /// Returns `false` if either stage failed, which includes submissions that carry no 13F-HR
    /// document at all. Whatever a stage could extract is kept even when the other fails.
    pub fn process(&mut self) -> bool {
        let metadata = self.process_metadata();
        let holdings = self.process_holdings();
        tracing::info!(
            accession_number = self.metadata.accession_number.as_deref().unwrap_or(""),
            holdings = self.holdings.len(),
            metadata,
            "processed 13F filing"
        );
        metadata && holdings
    }

    /// Fills [`Filing13F::metadata`]. Returns `false` when the filing is not a 13F report.
    pub fn process_metadata(&mut self) -> bool {
        match extract_metadata(&self.filing) {
            Some(metadata) => {
                self.metadata = metadata;
                true
            }
            None => false,
        }
    }

    /// Fills [`Filing13F::holdings`].
    ///
    /// Returns `false` when there is no holdings source or the table as a whole could not be
    /// read. Individual bad rows never make this fail.
    pub fn process_holdings(&mut self) -> bool {
        let source = HoldingsSource::detect(&self.filing);
        if source.is_absent() {
            return false;
        }
        match source.extract(&self.config) {
            Ok(holdings) => {
                self.holdings = holdings;
                true
            }
            Err(err) => {
                tracing::error!("Failed to extract holdings: {}", err);
                false
            }
        }
    }

    pub fn filing(&self) -> &Filing {
        &self.filing
    }

    pub fn metadata(&self) -> &FilerMetadata {
        &self.metadata
    }

    /// Holdings in source row order.
    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn into_holdings(self) -> Vec<Holding> {
        self.holdings
    }
}

impl From<Filing> for Filing13F {
    fn from(filing: Filing) -> Self {
        Self {
            filing,
            ..Default::default()
        }
    }
}

impl Deref for Filing13F {
    type Target = Filing;

    fn deref(&self) -> &Filing {
        &self.filing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(documents: &[(&str, &str)]) -> String {
        let mut raw = String::from(
            "<SEC-HEADER>\nACCESSION NUMBER:\t0000000001-19-000001\n\
             CONFORMED PERIOD OF REPORT:\t20181231\n</SEC-HEADER>\n",
        );
        for (doc_type, body) in documents {
            raw.push_str(&format!("<DOCUMENT>\n<TYPE>{}\n{}\n</DOCUMENT>\n", doc_type, body));
        }
        raw
    }

    const INFO_TABLE: &str = r#"<TEXT>
<XML>
<informationTable xmlns="http://www.sec.gov/edgar/document/thirteenf/informationtable">
  <infoTable>
    <nameOfIssuer>APPLE INC</nameOfIssuer>
    <titleOfClass>COM</titleOfClass>
    <cusip>037833100</cusip>
    <value>100</value>
    <shrsOrPrnAmt><sshPrnamt>5</sshPrnamt><sshPrnamtType>SH</sshPrnamtType></shrsOrPrnAmt>
  </infoTable>
</informationTable>
</XML>
</TEXT>"#;

    #[test]
    fn test_detect_source() {
        let xml = Filing::new(&submission(&[("13F-HR", "cover"), (INFORMATION_TABLE, INFO_TABLE)]));
        assert!(matches!(HoldingsSource::detect(&xml), HoldingsSource::XmlTable(_)));

        let text = Filing::new(&submission(&[("13F-HR", "<TABLE>\n</TABLE>")]));
        assert!(matches!(HoldingsSource::detect(&text), HoldingsSource::TextTable(_)));

        let amended = Filing::new(&submission(&[("13F-HR/A", "cover")]));
        assert!(matches!(HoldingsSource::detect(&amended), HoldingsSource::TextTable(_)));

        let other = Filing::new(&submission(&[("10-K", "annual report")]));
        assert_eq!(HoldingsSource::detect(&other), HoldingsSource::Absent);
    }

    #[test]
    fn test_process_xml_filing() {
        let mut filing = Filing13F::new(&submission(&[
            ("13F-HR", "cover"),
            (INFORMATION_TABLE, INFO_TABLE),
        ]));
        assert!(filing.process());

        assert_eq!(
            filing.metadata().accession_number.as_deref(),
            Some("0000000001-19-000001")
        );
        assert_eq!(filing.holdings().len(), 1);
        assert_eq!(filing.holdings()[0].value, 100_000);
        // Deref to the underlying filing.
        assert_eq!(filing.document_count(), 2);
    }

    #[test]
    fn test_process_non_13f_filing() {
        let mut filing = Filing13F::new(&submission(&[("10-K", "annual report")]));
        assert!(!filing.process());
        assert!(filing.holdings().is_empty());
        assert_eq!(filing.metadata(), &FilerMetadata::default());
        assert!(extract_metadata(filing.filing()).is_none());
        assert!(extract_holdings(filing.filing()).unwrap().is_empty());
    }

    #[test]
    fn test_information_table_without_xml() {
        let filing = Filing::new(&submission(&[
            ("13F-HR", "cover"),
            (INFORMATION_TABLE, "<TEXT>\nno xml\n</TEXT>"),
        ]));
        assert!(matches!(
            extract_holdings(&filing),
            Err(EdgarError::MissingElement(_))
        ));

        let mut filing = Filing13F::from(filing);
        assert!(filing.process_metadata());
        assert!(!filing.process_holdings());
    }

    #[test]
    fn test_malformed_xml_header_keeps_text_metadata() {
        let mut filing = Filing13F::new(&submission(&[(
            "13F-HR",
            "<XML>\n<edgarSubmission>\n</XML>",
        )]));
        assert!(filing.process_metadata());
        assert_eq!(
            filing.metadata().period_of_report.unwrap().to_string(),
            "2018-12-31"
        );
    }
}
