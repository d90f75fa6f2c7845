//! Raw EDGAR submission splitting.
//!
//! A full submission (`<accession>.txt` in the archives) is one SGML-like text blob:
//!
//! ```text
//! <SEC-DOCUMENT>0000002230-00-000003.txt : 20000215
//! <SEC-HEADER>0000002230-00-000003.hdr.sgml : 20000215
//! ACCESSION NUMBER:		0000002230-00-000003
//! ...
//! </SEC-HEADER>
//! <DOCUMENT>
//! <TYPE>13F-HR
//! ...
//! </DOCUMENT>
//! </SEC-DOCUMENT>
//! ```
//!
//! [`Filing`] keeps the header block and every `<DOCUMENT>` body keyed by its `<TYPE>` tag.
//! Markers that are missing or out of order never fail the split; they simply produce
//! an empty header or fewer documents.

use std::collections::HashMap;

const HEADER_START: &str = "<SEC-HEADER>";
const HEADER_END: &str = "</SEC-HEADER>";
const DOCUMENT_START: &str = "<DOCUMENT>";
const DOCUMENT_END: &str = "</DOCUMENT>";
const TYPE_TAG: &str = "<TYPE>";

/// A raw submission decomposed into its header and typed documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filing {
    header: String,
    documents: HashMap<String, String>,
    /// Document types in order of first appearance.
    order: Vec<String>,
}

impl Filing {
    /// Splits a raw submission into header and documents.
    ///
    /// The header is taken from the first `<SEC-HEADER>` block. Documents are then read from
    /// the remainder one `<DOCUMENT>` block at a time until no complete block is left. When two
    /// documents share a type, the later body replaces the earlier one.
    ///
    /// # Example
    ///
    /// ```
    /// use edgar13f::Filing;
    ///
    /// let raw = "<SEC-HEADER>\nACCESSION NUMBER: 1\n</SEC-HEADER>\n<DOCUMENT>\n<TYPE>13F-HR\nbody\n</DOCUMENT>\n";
    /// let filing = Filing::new(raw);
    /// assert_eq!(filing.header(), "ACCESSION NUMBER: 1\n");
    /// assert_eq!(filing.document("13F-HR"), Some("<TYPE>13F-HR\nbody\n"));
    /// ```
    pub fn new(raw: &str) -> Self {
        let (header, body) = extract_section(raw, HEADER_START, HEADER_END);

        let mut filing = Filing {
            header: header.to_string(),
            ..Default::default()
        };

        let (mut document, mut rest) = extract_section(body, DOCUMENT_START, DOCUMENT_END);
        while !document.is_empty() {
            let doc_type = extract_tag(document, TYPE_TAG);
            filing.insert(doc_type, document);
            (document, rest) = extract_section(rest, DOCUMENT_START, DOCUMENT_END);
        }

        tracing::debug!(
            header_len = filing.header.len(),
            documents = filing.documents.len(),
            "split filing"
        );
        filing
    }

    fn insert(&mut self, doc_type: &str, body: &str) {
        if !self.documents.contains_key(doc_type) {
            self.order.push(doc_type.to_string());
        }
        self.documents.insert(doc_type.to_string(), body.to_string());
    }

    /// The text between `<SEC-HEADER>` and `</SEC-HEADER>`, or `""` when absent.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Looks up a document body by its `<TYPE>` tag.
    pub fn document(&self, doc_type: &str) -> Option<&str> {
        self.documents.get(doc_type).map(String::as_str)
    }

    pub fn has_document(&self, doc_type: &str) -> bool {
        self.documents.contains_key(doc_type)
    }

    /// Iterates `(type, body)` pairs in the order the types first appear in the submission.
    pub fn documents(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .filter_map(|key| self.documents.get(key).map(|body| (key.as_str(), body.as_str())))
    }

    /// Document types in order of first appearance.
    pub fn document_types(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }
}

impl From<&str> for Filing {
    fn from(raw: &str) -> Self {
        Filing::new(raw)
    }
}

impl From<String> for Filing {
    fn from(raw: String) -> Self {
        Filing::new(&raw)
    }
}

/// Extracts the text between the first `start` and `end` markers.
///
/// The returned section skips the single delimiter character that follows `start` (normally
/// the newline), and the returned remainder begins after the delimiter that follows `end`.
/// If either marker is missing, or `end` comes before the section would begin, the section is
/// empty and the remainder is the untouched input.
pub fn extract_section<'a>(input: &'a str, start: &str, end: &str) -> (&'a str, &'a str) {
    let (Some(start_pos), Some(end_pos)) = (input.find(start), input.find(end)) else {
        return ("", input);
    };

    let content_start = skip_delimiter(input, start_pos + start.len());
    let section = if content_start <= end_pos {
        &input[content_start..end_pos]
    } else {
        ""
    };
    let rest = &input[skip_delimiter(input, end_pos + end.len())..];
    (section, rest)
}

/// Reads the value of a single-line tag such as `<TYPE>13F-HR`.
///
/// Returns `""` when the tag is absent or not terminated by a newline.
pub fn extract_tag<'a>(document: &'a str, tag: &str) -> &'a str {
    let Some(start) = document.find(tag) else {
        return "";
    };
    let value_start = start + tag.len();
    match document[value_start..].find('\n') {
        Some(len) => document[value_start..value_start + len].trim_end(),
        None => "",
    }
}

/// Byte offset just past the character at `pos`, clamped to the input length.
fn skip_delimiter(input: &str, pos: usize) -> usize {
    input[pos..]
        .chars()
        .next()
        .map_or(input.len(), |c| pos + c.len_utf8())
}
