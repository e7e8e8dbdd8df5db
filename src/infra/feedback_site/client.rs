use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use lesson_feedback::fetch::{BasicClient, HttpClient, auth::SessionCookie, fetch_text};

use crate::services::report_source::ReportSource;

pub const DEFAULT_REPORT_URL: &str = "https://artofproblemsolving.com/reports/self-paced-feedback";

/// Retrieves the self-paced feedback report from the live site.
///
/// The report is only served to logged-in staff, so the client replays the
/// cookies of a browser session in which login (including MFA) was completed.
pub struct FeedbackSiteClient {
    report_url: String,
    http: Box<dyn HttpClient>,
}

impl FeedbackSiteClient {
    pub fn new(report_url: String, session_cookie: Option<&str>) -> Result<Self> {
        let basic = BasicClient::new()?;
        let http: Box<dyn HttpClient> = match session_cookie {
            Some(cookie) => Box::new(SessionCookie::new(basic, cookie)?),
            None => {
                warn!("No session cookie configured, requesting the report anonymously");
                Box::new(basic)
            }
        };

        Ok(Self { report_url, http })
    }
}

#[async_trait]
impl ReportSource for FeedbackSiteClient {
    async fn fetch_report(&self) -> Result<String> {
        info!(url = %self.report_url, "Fetching feedback report");
        let html = fetch_text(&self.http, &self.report_url).await?;

        // a login page is served with 200 when the session has expired
        if !html.contains("card-header") {
            warn!(
                url = %self.report_url,
                "Report page has no feedback cards; the session cookie may have expired"
            );
        }

        Ok(html)
    }
}
