//! Error taxonomy shared by the session store and the resource clients.
//!
//! Every failing operation surfaces one of five kinds. Each variant carries a
//! message that can be shown to the user as-is.

use serde::Deserialize;

/// Discriminant of a [`CatalogError`], for callers that branch on the kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Auth,
    NotFound,
    Network,
    Server,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Malformed or missing input, detected locally or reported as a 4xx by the backend.
    #[error("{message}")]
    Validation {
        message: String,
        /// Text fields of the rejected payload, empty for local checks.
        echoed: Vec<(String, String)>,
    },
    #[error("{message}")]
    Auth { message: String },
    #[error("{message}")]
    NotFound { message: String },
    /// No response was received.
    #[error("could not reach the service: {0}")]
    Network(#[source] reqwest::Error),
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },
}

impl CatalogError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            echoed: Vec::new(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::Validation { .. } => ErrorKind::Validation,
            CatalogError::Auth { .. } => ErrorKind::Auth,
            CatalogError::NotFound { .. } => ErrorKind::NotFound,
            CatalogError::Network(_) => ErrorKind::Network,
            CatalogError::Server { .. } => ErrorKind::Server,
        }
    }

    /// Short message suitable for an inline notification.
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::Validation { message, .. }
            | CatalogError::Auth { message }
            | CatalogError::NotFound { message } => message.clone(),
            CatalogError::Network(_) => {
                "Catalog service is unreachable. Check that the backend is running.".to_string()
            }
            CatalogError::Server { status, message } => {
                format!("Server error ({status}): {message}")
            }
        }
    }

    /// A successful response whose body is not the expected shape.
    pub(crate) fn undecodable(status: u16, error: &serde_json::Error) -> Self {
        Self::Server {
            status,
            message: format!("unexpected response body: {error}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// FastAPI error body: `{"detail": "..."}` or `{"detail": [{"loc": [...], "msg": "..."}]}`.
#[derive(Deserialize)]
struct ErrorBody {
    detail: Detail,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Detail {
    Message(String),
    Issues(Vec<Issue>),
}

#[derive(Deserialize)]
struct Issue {
    #[serde(default)]
    loc: Vec<serde_json::Value>,
    msg: String,
}

/// Extract the human-readable `detail` of an error body, if it has one.
pub(crate) fn detail_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        Detail::Message(message) if !message.is_empty() => Some(message),
        Detail::Message(_) => None,
        Detail::Issues(issues) if issues.is_empty() => None,
        Detail::Issues(issues) => Some(
            issues
                .iter()
                .map(|issue| match issue.loc.last().and_then(|l| l.as_str()) {
                    Some(field) => format!("{field}: {}", issue.msg),
                    None => issue.msg.clone(),
                })
                .collect::<Vec<_>>()
                .join("; "),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_detail_is_used_verbatim() {
        let body = r#"{"detail":"Album not found"}"#;
        assert_eq!(detail_message(body).as_deref(), Some("Album not found"));
    }

    #[test]
    fn validation_issues_name_their_field() {
        let body = r#"{"detail":[
            {"type":"missing","loc":["body","Country"],"msg":"Field required","input":null},
            {"type":"int_parsing","loc":["body","Total_tracks"],"msg":"Input should be a valid integer"}
        ]}"#;
        assert_eq!(
            detail_message(body).as_deref(),
            Some("Country: Field required; Total_tracks: Input should be a valid integer")
        );
    }

    #[test]
    fn non_json_body_has_no_detail() {
        assert_eq!(detail_message("Internal Server Error"), None);
        assert_eq!(detail_message(r#"{"detail":""}"#), None);
        assert_eq!(detail_message(r#"{"detail":[]}"#), None);
    }

    #[test]
    fn kinds_match_variants() {
        assert_eq!(CatalogError::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(CatalogError::auth("x").kind(), ErrorKind::Auth);
        let server = CatalogError::Server {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(server.kind(), ErrorKind::Server);
        assert_eq!(server.user_message(), "Server error (500): boom");
    }

    #[test]
    fn undecodable_bodies_keep_the_real_status() {
        let json_err = serde_json::from_str::<Vec<u64>>("{oops").unwrap_err();
        let err = CatalogError::undecodable(201, &json_err);
        assert_eq!(err.kind(), ErrorKind::Server);
        assert!(err.to_string().starts_with("server error 201: unexpected response body"));
    }
}
