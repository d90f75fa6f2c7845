//! Filer metadata for 13F submissions.
//!
//! Two sources exist depending on the filing's vintage. Every submission carries the plain
//! text SEC header (`KEY: VALUE` lines grouped under section lines such as `COMPANY DATA:`).
//! Filings made since the 2013 XML mandate also embed a structured `edgarSubmission` document
//! in the `13F-HR` body. The header is always read first; the XML values then override it.

use super::super::filing::{Filing, extract_section};
use super::primary_document;
use crate::error::{EdgarError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const FILER_NAMESPACE: &str = "http://www.sec.gov/edgar/thirteenffiler";
const COMMON_NAMESPACE: &str = "http://www.sec.gov/edgar/common";

const HEADER_DATE_FORMAT: &str = "%Y%m%d";
const XML_DATE_FORMAT: &str = "%m-%d-%Y";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street1: String,
    pub street2: Option<String>,
    pub city: String,
    pub state_or_country: String,
    pub zip_code: String,
}

/// Descriptive fields of a 13F filing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilerMetadata {
    pub accession_number: Option<String>,
    pub submission_type: Option<String>,
    pub period_of_report: Option<NaiveDate>,
    /// Signature date from the XML cover page, or the `FILED AS OF DATE` of the header.
    pub signature_date: Option<NaiveDate>,
    pub manager_name: Option<String>,
    pub cik: Option<String>,
    pub form_type: Option<String>,
    pub file_number: Option<String>,
    pub business_address: Address,
    pub mail_address: Address,
}

/// Extracts filer metadata, or `None` when the filing has no 13F-HR document.
///
/// The SEC header is parsed first. If the 13F-HR document embeds an XML header, its values
/// replace the header-derived ones; an XML header that fails to parse is logged and ignored.
pub fn extract_metadata(filing: &Filing) -> Option<FilerMetadata> {
    let (_, document) = primary_document(filing)?;

    let mut metadata = parse_header(filing.header());

    let (xml, _) = extract_section(document, "<XML>", "</XML>");
    if !xml.is_empty() {
        match parse_xml_header(xml.trim()) {
            Ok(header) => header.apply(&mut metadata),
            Err(err) => {
                tracing::warn!(
                    accession_number = metadata.accession_number.as_deref().unwrap_or(""),
                    "Ignoring XML header: {}",
                    err
                );
            }
        }
    }

    Some(metadata)
}

/// Section of the SEC header currently being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderSection {
    None,
    Filer,
    CompanyData,
    FilingValues,
    BusinessAddress,
    MailAddress,
}

impl HeaderSection {
    pub const VARIANTS: &'static [(&'static str, HeaderSection)] = &[
        ("FILER:", HeaderSection::Filer),
        ("COMPANY DATA:", HeaderSection::CompanyData),
        ("FILING VALUES:", HeaderSection::FilingValues),
        ("BUSINESS ADDRESS:", HeaderSection::BusinessAddress),
        ("MAIL ADDRESS:", HeaderSection::MailAddress),
    ];

    /// Returns the section a trimmed header line opens, if it is a section line.
    pub fn from_line(line: &str) -> Option<Self> {
        Self::VARIANTS
            .iter()
            .find(|(literal, _)| *literal == line)
            .map(|(_, section)| *section)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    Business,
    Mail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    Street1,
    Street2,
    City,
    State,
    Zip,
}

/// Metadata field written by a `KEY: VALUE` header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    AccessionNumber,
    SubmissionType,
    PeriodOfReport,
    FiledAsOfDate,
    ManagerName,
    CentralIndexKey,
    FormType,
    FileNumber,
    Address(AddressKind, AddressField),
}

/// Every `(section, key)` pair the header parser understands.
pub const HEADER_FIELDS: &[(HeaderSection, &str, HeaderField)] = &[
    (HeaderSection::None, "ACCESSION NUMBER", HeaderField::AccessionNumber),
    (HeaderSection::None, "CONFORMED SUBMISSION TYPE", HeaderField::SubmissionType),
    (HeaderSection::None, "CONFORMED PERIOD OF REPORT", HeaderField::PeriodOfReport),
    (HeaderSection::None, "FILED AS OF DATE", HeaderField::FiledAsOfDate),
    (HeaderSection::CompanyData, "COMPANY CONFORMED NAME", HeaderField::ManagerName),
    (HeaderSection::CompanyData, "CENTRAL INDEX KEY", HeaderField::CentralIndexKey),
    (HeaderSection::FilingValues, "FORM TYPE", HeaderField::FormType),
    (HeaderSection::FilingValues, "SEC FILE NUMBER", HeaderField::FileNumber),
    (
        HeaderSection::BusinessAddress,
        "STREET 1",
        HeaderField::Address(AddressKind::Business, AddressField::Street1),
    ),
    (
        HeaderSection::BusinessAddress,
        "STREET 2",
        HeaderField::Address(AddressKind::Business, AddressField::Street2),
    ),
    (
        HeaderSection::BusinessAddress,
        "CITY",
        HeaderField::Address(AddressKind::Business, AddressField::City),
    ),
    (
        HeaderSection::BusinessAddress,
        "STATE",
        HeaderField::Address(AddressKind::Business, AddressField::State),
    ),
    (
        HeaderSection::BusinessAddress,
        "ZIP",
        HeaderField::Address(AddressKind::Business, AddressField::Zip),
    ),
    (
        HeaderSection::MailAddress,
        "STREET 1",
        HeaderField::Address(AddressKind::Mail, AddressField::Street1),
    ),
    (
        HeaderSection::MailAddress,
        "STREET 2",
        HeaderField::Address(AddressKind::Mail, AddressField::Street2),
    ),
    (
        HeaderSection::MailAddress,
        "CITY",
        HeaderField::Address(AddressKind::Mail, AddressField::City),
    ),
    (
        HeaderSection::MailAddress,
        "STATE",
        HeaderField::Address(AddressKind::Mail, AddressField::State),
    ),
    (
        HeaderSection::MailAddress,
        "ZIP",
        HeaderField::Address(AddressKind::Mail, AddressField::Zip),
    ),
];

impl HeaderField {
    /// Looks up the field a key writes while `section` is open.
    pub fn lookup(section: HeaderSection, key: &str) -> Option<Self> {
        HEADER_FIELDS
            .iter()
            .find(|(s, k, _)| *s == section && *k == key)
            .map(|(_, _, field)| *field)
    }
}

/// Line-oriented reader for the plain-text SEC header.
#[derive(Debug)]
pub struct HeaderParser {
    section: HeaderSection,
    metadata: FilerMetadata,
}

impl Default for HeaderParser {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderParser {
    pub fn new() -> Self {
        Self {
            section: HeaderSection::None,
            metadata: FilerMetadata::default(),
        }
    }

    pub fn section(&self) -> HeaderSection {
        self.section
    }

    /// Feeds one header line: either a section transition or a `KEY: VALUE` write.
    pub fn feed(&mut self, line: &str) {
        let line = line.trim();
        if let Some(section) = HeaderSection::from_line(line) {
            self.section = section;
            return;
        }

        let Some((key, value)) = line.split_once(':') else {
            return;
        };
        let key = key.trim().to_uppercase();
        let value = value.trim().to_uppercase();

        if let Some(field) = HeaderField::lookup(self.section, &key) {
            self.write(field, value);
        }
    }

    fn write(&mut self, field: HeaderField, value: String) {
        let metadata = &mut self.metadata;
        match field {
            HeaderField::AccessionNumber => metadata.accession_number = Some(value),
            HeaderField::SubmissionType => metadata.submission_type = Some(value),
            HeaderField::PeriodOfReport => {
                metadata.period_of_report = parse_header_date("CONFORMED PERIOD OF REPORT", &value)
            }
            HeaderField::FiledAsOfDate => {
                metadata.signature_date = parse_header_date("FILED AS OF DATE", &value)
            }
            HeaderField::ManagerName => metadata.manager_name = Some(value),
            HeaderField::CentralIndexKey => metadata.cik = Some(value),
            HeaderField::FormType => metadata.form_type = Some(value),
            HeaderField::FileNumber => metadata.file_number = Some(value),
            HeaderField::Address(kind, part) => {
                let address = match kind {
                    AddressKind::Business => &mut metadata.business_address,
                    AddressKind::Mail => &mut metadata.mail_address,
                };
                match part {
                    AddressField::Street1 => address.street1 = value,
                    AddressField::Street2 => address.street2 = Some(value),
                    AddressField::City => address.city = value,
                    AddressField::State => address.state_or_country = value,
                    AddressField::Zip => address.zip_code = value,
                }
            }
        }
    }

    pub fn finish(self) -> FilerMetadata {
        self.metadata
    }
}

/// Parses the plain-text SEC header into metadata.
pub fn parse_header(header: &str) -> FilerMetadata {
    let mut parser = HeaderParser::new();
    for line in header.lines() {
        parser.feed(line);
    }
    parser.finish()
}

fn parse_header_date(key: &str, value: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(value, HEADER_DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(err) => {
            tracing::warn!("Unparsable {} {:?}: {}", key, value, err);
            None
        }
    }
}

/// Values read from the embedded `edgarSubmission` XML header.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlHeader {
    pub period_of_report: NaiveDate,
    pub cik: String,
    pub manager_name: String,
    pub address: Address,
    pub signature_date: NaiveDate,
}

impl XmlHeader {
    /// Overwrites the fields this header carries.
    pub fn apply(self, metadata: &mut FilerMetadata) {
        metadata.period_of_report = Some(self.period_of_report);
        metadata.cik = Some(self.cik);
        metadata.manager_name = Some(self.manager_name);
        metadata.business_address = self.address;
        metadata.signature_date = Some(self.signature_date);
    }
}

/// Parses an `edgarSubmission` XML header.
///
/// # Errors
///
/// * `EdgarError::XmlError` if the text is not well-formed XML.
/// * `EdgarError::MissingElement` naming the path of the first required element not found.
/// * `EdgarError::InvalidFormat` if a date is not `MM-DD-YYYY`.
pub fn parse_xml_header(xml: &str) -> Result<XmlHeader> {
    let document = roxmltree::Document::parse(xml)?;
    let root = document.root_element();

    let address = Address {
        street1: required_text(root, "formData/coverPage/filingManager/address/com:street1")?,
        street2: optional_text(root, "formData/coverPage/filingManager/address/com:street2"),
        city: required_text(root, "formData/coverPage/filingManager/address/com:city")?,
        state_or_country: required_text(
            root,
            "formData/coverPage/filingManager/address/com:stateOrCountry",
        )?,
        zip_code: required_text(root, "formData/coverPage/filingManager/address/com:zipCode")?,
    };

    Ok(XmlHeader {
        period_of_report: required_date(root, "headerData/filerInfo/periodOfReport")?,
        cik: required_text(root, "headerData/filerInfo/filer/credentials/cik")?,
        manager_name: required_text(root, "formData/coverPage/filingManager/name")?,
        address,
        signature_date: required_date(root, "formData/signatureBlock/signatureDate")?,
    })
}

/// Walks a `/`-separated path of child elements. Steps prefixed `com:` are in the EDGAR
/// common namespace, all others in the 13F filer namespace.
fn find_path<'a, 'input>(
    root: roxmltree::Node<'a, 'input>,
    path: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    path.split('/').try_fold(root, |node, step| {
        let (namespace, name) = match step.strip_prefix("com:") {
            Some(name) => (COMMON_NAMESPACE, name),
            None => (FILER_NAMESPACE, step),
        };
        node.children()
            .find(|child| child.is_element() && child.has_tag_name((namespace, name)))
    })
}

fn optional_text(root: roxmltree::Node, path: &str) -> Option<String> {
    find_path(root, path)
        .and_then(|node| node.text())
        .map(|text| text.trim().to_string())
}

fn required_text(root: roxmltree::Node, path: &str) -> Result<String> {
    optional_text(root, path).ok_or_else(|| EdgarError::MissingElement(path.to_string()))
}

fn required_date(root: roxmltree::Node, path: &str) -> Result<NaiveDate> {
    let text = required_text(root, path)?;
    NaiveDate::parse_from_str(&text, XML_DATE_FORMAT)
        .map_err(|e| EdgarError::InvalidFormat(format!("{} {:?}: {}", path, text, e)))
}
