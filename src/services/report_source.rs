//! Trait for obtaining the raw feedback report page.

use anyhow::Result;

/// Abstraction over where the report HTML comes from (live site, saved file).
#[async_trait::async_trait]
pub trait ReportSource: Send + Sync {
    /// Returns the full report page as HTML text.
    async fn fetch_report(&self) -> Result<String>;
}

/// A report page previously saved to disk.
pub struct SavedPage {
    pub path: String,
}

#[async_trait::async_trait]
impl ReportSource for SavedPage {
    async fn fetch_report(&self) -> Result<String> {
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }
}
