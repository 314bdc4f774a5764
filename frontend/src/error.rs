use serde::Deserialize;
use thiserror::Error;

/* -------------------------------------------------------------------------- */
/*                          failed API calls                                  */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, CORS, offline…).
    #[error("network error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// 2xx response whose body did not match the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Authentication,
    Authorization,
    Validation,
    Server,
    Decode,
}

#[derive(Deserialize)]
struct DetailBody {
    detail: serde_json::Value,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::Decode(_) => ErrorKind::Decode,
            ApiError::Status { status: 401, .. } => ErrorKind::Authentication,
            ApiError::Status { status: 403, .. } => ErrorKind::Authorization,
            ApiError::Status { status, .. } if *status >= 500 => ErrorKind::Server,
            ApiError::Status { .. } => ErrorKind::Validation,
        }
    }


    /// `detail` field of a FastAPI-style error body, when there is one.
    pub fn detail(&self) -> Option<String> {
        let ApiError::Status { body, .. } = self else {
            return None;
        };
        let parsed: DetailBody = serde_json::from_str(body).ok()?;
        match parsed.detail {
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}

/// Which failed calls send the user back to `/login`; each screen picks its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginRedirect {
    Never,
    /// 403 only.
    OnForbidden,
    /// 401 or 403: the credential is missing, expired or for another role.
    OnAuthFailure,
}

impl LoginRedirect {
    pub fn applies(self, error: &ApiError) -> bool {
        match self {
            LoginRedirect::Never => false,
            LoginRedirect::OnForbidden => error.kind() == ErrorKind::Authorization,
            LoginRedirect::OnAuthFailure => {
                matches!(error.kind(), ErrorKind::Authentication | ErrorKind::Authorization)
            }
        }
    }
}

impl From<gloo_net::Error> for ApiError {
    fn from(e: gloo_net::Error) -> Self {
        match e {
            gloo_net::Error::SerdeError(e) => ApiError::Decode(e.to_string()),
            other => ApiError::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16, body: &str) -> ApiError {
        ApiError::Status { status: code, body: body.into() }
    }

    #[test]
    fn classifies_statuses() {
        assert_eq!(status(401, "").kind(), ErrorKind::Authentication);
        assert_eq!(status(403, "").kind(), ErrorKind::Authorization);
        assert_eq!(status(400, "").kind(), ErrorKind::Validation);
        assert_eq!(status(422, "").kind(), ErrorKind::Validation);
        assert_eq!(status(502, "").kind(), ErrorKind::Server);
        assert_eq!(ApiError::Transport("offline".into()).kind(), ErrorKind::Transport);
    }

    #[test]
    fn redirect_policies() {
        let offline = ApiError::Transport("x".into());

        assert!(!LoginRedirect::Never.applies(&status(403, "")));

        assert!(LoginRedirect::OnForbidden.applies(&status(403, "")));
        assert!(!LoginRedirect::OnForbidden.applies(&status(401, "")));
        assert!(!LoginRedirect::OnForbidden.applies(&offline));

        assert!(LoginRedirect::OnAuthFailure.applies(&status(401, "")));
        assert!(LoginRedirect::OnAuthFailure.applies(&status(403, "")));
        assert!(!LoginRedirect::OnAuthFailure.applies(&status(400, "")));
        assert!(!LoginRedirect::OnAuthFailure.applies(&offline));
    }

    #[test]
    fn extracts_detail() {
        assert_eq!(
            status(400, r#"{"detail":"Email already registered"}"#).detail().as_deref(),
            Some("Email already registered")
        );
        assert_eq!(status(500, "Internal Server Error").detail(), None);
        assert_eq!(ApiError::Decode("x".into()).detail(), None);
    }

    #[test]
    fn structured_detail_is_kept_as_json() {
        let e = status(422, r#"{"detail":[{"loc":["body","email"]}]}"#);
        assert!(e.detail().unwrap().contains("email"));
        assert_eq!(e.kind(), ErrorKind::Validation);
    }
}
