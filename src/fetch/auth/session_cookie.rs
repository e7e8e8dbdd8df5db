use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::{COOKIE, HeaderValue};

/// An [`HttpClient`] wrapper that sends a logged-in browser session's cookies.
///
/// `cookie` is the raw `Cookie` header value copied from an authenticated
/// session, e.g. `"sessionid=abc; csrftoken=def"`.
pub struct SessionCookie<C> {
    pub inner: C,
    cookie: HeaderValue,
}

impl<C> SessionCookie<C> {
    /// Fails if `cookie` contains characters not allowed in a header value.
    pub fn new(inner: C, cookie: &str) -> anyhow::Result<Self> {
        let mut cookie = HeaderValue::from_str(cookie.trim())
            .map_err(|e| anyhow::anyhow!("invalid session cookie: {}", e))?;
        cookie.set_sensitive(true);
        Ok(Self { inner, cookie })
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for SessionCookie<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut().insert(COOKIE, self.cookie.clone());
        self.inner.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records the requests it receives instead of sending them.
    struct Capture(Mutex<Vec<reqwest::Request>>);

    #[async_trait]
    impl HttpClient for Capture {
        async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
            self.0.lock().unwrap().push(req);
            Ok(http_response())
        }
    }

    fn http_response() -> reqwest::Response {
        reqwest::Response::from(
            http::Response::builder()
                .status(200)
                .body("ok")
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_cookie_header_is_injected() {
        let client =
            SessionCookie::new(Capture(Mutex::new(Vec::new())), " sessionid=abc ").unwrap();
        let url = "http://localhost/report".parse().unwrap();
        let req = reqwest::Request::new(reqwest::Method::GET, url);

        client.execute(req).await.unwrap();

        let sent = client.inner.0.lock().unwrap();
        assert_eq!(sent[0].headers()[COOKIE], "sessionid=abc");
    }

    #[test]
    fn test_invalid_cookie_is_rejected() {
        assert!(SessionCookie::new((), "bad\nvalue").is_err());
    }
}
