//! Storefront errors.
use async_graphql::ErrorExtensions;
use displaydoc::Display;
use serde::Serialize;
use thiserror::Error;

/// Error types for calls against the commerce platform.
///
/// These are surfaced to GraphQL clients through [`ErrorExtensions`], with the
/// failing service and status code attached as extensions.
#[derive(Error, Display, Debug, Clone, Serialize, Eq, PartialEq)]
#[serde(untagged)]
#[ignore_extra_doc_attributes]
#[non_exhaustive]
pub enum FetchError {
    /// HTTP fetch failed from '{service}': {reason}
    ///
    /// note that this relates to a transport or status error and not a decoding error
    SubrequestHttpError {
        /// The HTTP status returned by the service, if a response was received.
        status_code: Option<u16>,

        /// The service that failed.
        service: String,

        /// The reason the fetch failed.
        reason: String,
    },

    /// service '{service}' response was malformed: {reason}
    SubrequestMalformedResponse {
        /// The service that responded with the malformed response.
        service: String,

        /// The reason the deserialization failed.
        reason: String,
    },

    /// request to '{service}' was malformed: {reason}
    MalformedRequest {
        /// The service the request was meant for.
        service: String,

        /// The reason the request could not be built.
        reason: String,
    },
}

impl FetchError {
    /// The stable code reported in the `code` extension.
    pub fn extension_code(&self) -> &'static str {
        match self {
            FetchError::SubrequestHttpError { .. } => "SUBREQUEST_HTTP_ERROR",
            FetchError::SubrequestMalformedResponse { .. } => "SUBREQUEST_MALFORMED_RESPONSE",
            FetchError::MalformedRequest { .. } => "MALFORMED_REQUEST",
        }
    }

    /// The service the failure relates to.
    pub fn service(&self) -> &str {
        match self {
            FetchError::SubrequestHttpError { service, .. }
            | FetchError::SubrequestMalformedResponse { service, .. }
            | FetchError::MalformedRequest { service, .. } => service,
        }
    }

    pub(crate) fn status_code(&self) -> Option<u16> {
        match self {
            FetchError::SubrequestHttpError { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

impl ErrorExtensions for FetchError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, extensions| {
            extensions.set("code", self.extension_code());
            extensions.set("service", self.service());
            if let Some(status) = self.status_code() {
                extensions.set("status", i32::from(status));
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_extensions_carry_status() {
        let error = FetchError::SubrequestHttpError {
            status_code: Some(503),
            service: "checkout".to_string(),
            reason: "service unavailable".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "HTTP fetch failed from 'checkout': service unavailable"
        );

        let extended = error.extend();
        let extensions = extended.extensions.expect("extensions are set");
        assert_eq!(
            extensions.get("code"),
            Some(&async_graphql::Value::from("SUBREQUEST_HTTP_ERROR"))
        );
        assert_eq!(
            extensions.get("service"),
            Some(&async_graphql::Value::from("checkout"))
        );
        assert_eq!(
            extensions.get("status"),
            Some(&async_graphql::Value::from(503))
        );
    }

    #[test]
    fn malformed_response_has_no_status() {
        let error = FetchError::SubrequestMalformedResponse {
            service: "catalog".to_string(),
            reason: "expected a sequence".to_string(),
        };
        let extended = error.extend();
        let extensions = extended.extensions.expect("extensions are set");
        assert!(extensions.get("status").is_none());
        assert_eq!(error.extension_code(), "SUBREQUEST_MALFORMED_RESPONSE");
    }

    #[test]
    fn display_uses_first_doc_paragraph() {
        let error = FetchError::SubrequestHttpError {
            status_code: None,
            service: "catalog".to_string(),
            reason: "connection refused".to_string(),
        };
        let message = error.to_string();
        assert_eq!(message, "HTTP fetch failed from 'catalog': connection refused");
        assert!(!message.contains("note that"));

        let error = FetchError::MalformedRequest {
            service: "checkout".to_string(),
            reason: "cannot be a base url".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "request to 'checkout' was malformed: cannot be a base url"
        );
    }
}
