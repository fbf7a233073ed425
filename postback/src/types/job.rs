use std::fmt;

use serde::Deserialize;

use crate::bail;
use crate::error::{ErrorKind, PostbackResult};

/// HTTP verb a postback is delivered with.
///
/// GET is currently the only supported verb. Messages that omit the method
/// default to it; messages that name any other verb are rejected at decode
/// time so that workers never see a job they cannot dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    /// HTTP GET.
    #[default]
    Get,
}

impl HttpMethod {
    /// Returns the canonical uppercase name of the verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded unit of work: a single postback to deliver.
///
/// Jobs are immutable once decoded and consumed exactly once by exactly one
/// worker. The `url` field keeps the exact string received from the queue;
/// decoding validates it parses as an `http`/`https` URL but does not
/// normalize it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Verb to deliver with.
    pub method: HttpMethod,
    /// Endpoint to deliver to.
    pub url: String,
}

/// Wire shape of a queue message, before validation.
#[derive(Debug, Deserialize)]
struct RawJob {
    method: Option<String>,
    url: Option<String>,
}

impl Job {
    /// Decodes a raw queue message into a [`Job`].
    ///
    /// Returns [`ErrorKind::DeserializationError`] for malformed JSON and
    /// [`ErrorKind::InvalidJob`] for a missing/invalid `url` or an
    /// unsupported `method`. Callers drop the message on error; decode
    /// failures never reach a worker.
    pub fn decode(raw: &str) -> PostbackResult<Job> {
        let raw: RawJob = serde_json::from_str(raw)?;

        let Some(url) = raw.url.filter(|url| !url.is_empty()) else {
            bail!(ErrorKind::InvalidJob, "Job url is missing");
        };

        let parsed = match reqwest::Url::parse(&url) {
            Ok(parsed) => parsed,
            Err(err) => bail!(ErrorKind::InvalidJob, "Job url is not a valid URL", err),
        };

        if !matches!(parsed.scheme(), "http" | "https") {
            bail!(
                ErrorKind::InvalidJob,
                "Job url has an unsupported scheme",
                parsed.scheme()
            );
        }

        let method = match raw.method.as_deref() {
            None | Some("") => HttpMethod::Get,
            Some(method) if method.eq_ignore_ascii_case("get") => HttpMethod::Get,
            Some(other) => bail!(ErrorKind::InvalidJob, "Job method is not supported", other),
        };

        Ok(Job { method, url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_well_formed_message() {
        let job = Job::decode(r#"{"method":"GET","url":"https://example.test/ok"}"#).unwrap();

        assert_eq!(job.method, HttpMethod::Get);
        assert_eq!(job.url, "https://example.test/ok");
    }

    #[test]
    fn url_is_preserved_exactly() {
        let url = "https://example.test/path?tx=42&sig=a%2Fb";
        let job = Job::decode(&format!(r#"{{"url":"{url}"}}"#)).unwrap();

        assert_eq!(job.url, url);
    }

    #[test]
    fn missing_method_defaults_to_get() {
        let job = Job::decode(r#"{"url":"http://example.test/cb"}"#).unwrap();

        assert_eq!(job.method, HttpMethod::Get);
    }

    #[test]
    fn lowercase_method_is_accepted() {
        let job = Job::decode(r#"{"method":"get","url":"http://example.test/cb"}"#).unwrap();

        assert_eq!(job.method, HttpMethod::Get);
    }

    #[test]
    fn unsupported_method_is_a_decode_error() {
        let err = Job::decode(r#"{"method":"POST","url":"http://example.test/cb"}"#).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidJob);
        assert_eq!(err.detail(), Some("POST"));
    }

    #[test]
    fn missing_url_is_a_decode_error() {
        let err = Job::decode(r#"{"method":"GET"}"#).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidJob);
    }

    #[test]
    fn empty_url_is_a_decode_error() {
        let err = Job::decode(r#"{"url":""}"#).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidJob);
    }

    #[test]
    fn non_http_url_is_a_decode_error() {
        let err = Job::decode(r#"{"url":"not-a-valid::url"}"#).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidJob);
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let err = Job::decode("{truncated").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DeserializationError);
    }
}
