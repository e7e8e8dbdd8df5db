//! Credential wrappers for [`HttpClient`](super::HttpClient).

mod session_cookie;

pub use session_cookie::SessionCookie;
