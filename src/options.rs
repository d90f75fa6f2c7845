use crate::parsing::index::IndexEntry;

/// Filters applied to index listings.
#[derive(Debug, Clone)]
pub struct FilingOptions {
    pub form_types: Option<Vec<String>>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    pub ciks: Option<Vec<u64>>,
    /// Whether requesting `13F-HR` also matches `13F-HR/A`. Defaults to true.
    pub include_amendments: bool,
}

impl Default for FilingOptions {
    fn default() -> Self {
        Self {
            form_types: None,
            offset: None,
            limit: None,
            ciks: None,
            include_amendments: true,
        }
    }
}

impl FilingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_form_type(mut self, form_type: impl Into<String>) -> Self {
        self.form_types = Some(vec![form_type.into()]);
        self
    }

    pub fn with_form_types(mut self, form_types: Vec<String>) -> Self {
        self.form_types = Some(form_types);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_cik(mut self, cik: u64) -> Self {
        self.ciks = Some(vec![cik]);
        self
    }

    pub fn with_ciks(mut self, ciks: Vec<u64>) -> Self {
        self.ciks = Some(ciks);
        self
    }

    pub fn with_include_amendments(mut self, include_amendments: bool) -> Self {
        self.include_amendments = include_amendments;
        self
    }

    fn matches_form(&self, form_type: &str) -> bool {
        let form_type = form_type.trim();
        match &self.form_types {
            None => true,
            Some(wanted) => wanted.iter().any(|ft| {
                ft == form_type
                    || (self.include_amendments
                        && form_type
                            .strip_suffix("/A")
                            .is_some_and(|base| base == ft))
            }),
        }
    }

    /// Whether an entry passes the form type and CIK filters.
    pub fn matches(&self, entry: &IndexEntry) -> bool {
        self.matches_form(&entry.form_type)
            && self.ciks.as_ref().is_none_or(|ciks| ciks.contains(&entry.cik))
    }

    /// Keeps matching entries, then applies offset and limit.
    pub fn apply(&self, entries: Vec<IndexEntry>) -> Vec<IndexEntry> {
        entries
            .into_iter()
            .filter(|entry| self.matches(entry))
            .skip(self.offset.unwrap_or(0))
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}
