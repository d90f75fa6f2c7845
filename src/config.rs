use std::time::Duration;

/// SEC fair access ceiling, in requests per second.
pub const DEFAULT_RATE_LIMIT: u32 = 10;

/// Settings for the [`Edgar`](crate::Edgar) client.
#[derive(Debug, Clone)]
pub struct EdgarConfig {
    /// Sent with every request. The SEC asks for an application name and a contact address.
    pub user_agent: String,
    /// Requests per second.
    pub rate_limit: u32,
    pub timeout: Duration,
    pub base_urls: EdgarUrls,
}

/// Roots of the EDGAR services the client talks to.
#[derive(Debug, Clone)]
pub struct EdgarUrls {
    /// Filing archive root; submissions and index files live under it.
    pub archives: String,
}

impl Default for EdgarConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("edgar13f/{}", crate::VERSION),
            rate_limit: DEFAULT_RATE_LIMIT,
            timeout: Duration::from_secs(30),
            base_urls: EdgarUrls::default(),
        }
    }
}

impl EdgarConfig {
    /// ```
    /// use edgar13f::{Edgar, EdgarConfig};
    /// use std::time::Duration;
    ///
    /// let config = EdgarConfig::new("research_tool admin@example.com", 5, Duration::from_secs(60), None);
    /// assert_eq!(config.base_urls.archives, "https://www.sec.gov/Archives/edgar");
    /// let edgar = Edgar::with_config(config)?;
    /// # Ok::<(), edgar13f::EdgarError>(())
    /// ```
    pub fn new(
        user_agent: impl Into<String>,
        rate_limit: u32,
        timeout: Duration,
        base_urls: Option<EdgarUrls>,
    ) -> Self {
        Self {
            user_agent: user_agent.into(),
            rate_limit,
            timeout,
            base_urls: base_urls.unwrap_or_default(),
        }
    }
}

impl Default for EdgarUrls {
    fn default() -> Self {
        Self {
            archives: "https://www.sec.gov/Archives/edgar".to_string(),
        }
    }
}

impl EdgarUrls {
    /// Points the client at another archive root, e.g. a local mirror.
    pub fn with_archives(archives: impl Into<String>) -> Self {
        Self {
            archives: archives.into().trim_end_matches('/').to_string(),
        }
    }
}
