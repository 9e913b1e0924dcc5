//! `x-easel-*` response headers.
//!
//! Generation responses keep the OpenAI-style JSON body untouched and report
//! which provider served them through headers instead.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Provider that produced the images.
pub const PROVIDER_HEADER: &str = "x-easel-provider";
/// Provider calls made for the request, across all providers.
pub const ATTEMPTS_HEADER: &str = "x-easel-attempts";

/// Routing details attached to a generation response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchHeaders<'a> {
    pub provider_id: &'a str,
    pub attempts: u32,
    pub request_id: &'a str,
}

impl DispatchHeaders<'_> {
    /// Insert the headers. Values that are not valid header text are skipped.
    pub fn inject_into(&self, headers: &mut HeaderMap) {
        insert(headers, PROVIDER_HEADER, self.provider_id);
        insert(headers, ATTEMPTS_HEADER, &self.attempts.to_string());
        insert(headers, crate::logging::REQUEST_ID_HEADER, self.request_id);
    }
}

fn insert(headers: &mut HeaderMap, name: &'static str, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(HeaderName::from_static(name), value);
        }
        Err(_) => tracing::debug!(header = name, "Skipping header with invalid value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_all_headers() {
        let mut headers = HeaderMap::new();
        DispatchHeaders {
            provider_id: "mock-service",
            attempts: 4,
            request_id: "req-1",
        }
        .inject_into(&mut headers);

        assert_eq!(headers.get(PROVIDER_HEADER).unwrap(), "mock-service");
        assert_eq!(headers.get(ATTEMPTS_HEADER).unwrap(), "4");
        assert_eq!(headers.get("x-request-id").unwrap(), "req-1");
    }

    #[test]
    fn test_invalid_value_skipped() {
        let mut headers = HeaderMap::new();
        DispatchHeaders {
            provider_id: "bad\nid",
            attempts: 1,
            request_id: "req-1",
        }
        .inject_into(&mut headers);

        assert!(headers.get(PROVIDER_HEADER).is_none());
        assert!(headers.get(ATTEMPTS_HEADER).is_some());
    }
}
