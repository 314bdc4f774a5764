use gloo_net::http::{Method, Request, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use web_sys::UrlSearchParams;

use crate::config::API_BASE;
use crate::error::ApiError;
use crate::session::Credentials;

/* -------------------------------------------------------------------------- */
/*                       client bound to one origin                           */
/* -------------------------------------------------------------------------- */

#[derive(Clone, Debug, PartialEq)]
pub struct ApiClient {
    base:  String,
    token: Option<String>,
}

/// `base` + `path` with exactly one slash in between.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

impl ApiClient {
    pub fn new(credentials: Option<&Credentials>) -> Self {
        Self::with_base(API_BASE, credentials)
    }

    pub fn with_base(base: &str, credentials: Option<&Credentials>) -> Self {
        Self {
            base:  base.to_string(),
            token: credentials.map(|c| c.token.clone()),
        }
    }

    pub fn url(&self, path: &str) -> String {
        join_url(&self.base, path)
    }

    /// Authorization header value attached to every request, if any.
    pub fn authorization(&self) -> Option<String> {
        self.token.as_deref().map(bearer)
    }

    fn builder(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = RequestBuilder::new(&self.url(path)).method(method);
        match self.authorization() {
            Some(auth) => builder.header("Authorization", &auth),
            None => builder,
        }
    }

    /* ---------------- verbs ---------------- */

    pub async fn get<U: DeserializeOwned>(&self, path: &str) -> Result<U, ApiError> {
        let resp = self.builder(Method::GET, path).send().await?;
        read_json(resp).await
    }

    pub async fn post<T, U>(&self, path: &str, body: Option<&T>) -> Result<U, ApiError>
    where
        T: Serialize + ?Sized,
        U: DeserializeOwned,
    {
        self.send_json(Method::POST, path, body).await
    }

    pub async fn put<T, U>(&self, path: &str, body: &T) -> Result<U, ApiError>
    where
        T: Serialize + ?Sized,
        U: DeserializeOwned,
    {
        self.send_json(Method::PUT, path, Some(body)).await
    }

    /// `application/x-www-form-urlencoded` POST, used by `/login`.
    pub async fn post_form<U: DeserializeOwned>(
        &self,
        path: &str,
        fields: &[(&str, &str)],
    ) -> Result<U, ApiError> {
        let params = UrlSearchParams::new()
            .map_err(|e| ApiError::Transport(format!("{e:?}")))?;
        for (name, value) in fields {
            params.append(name, value);
        }
        let req: Request = self.builder(Method::POST, path).body(params)?;
        let resp = req.send().await?;
        read_json(resp).await
    }

    async fn send_json<T, U>(&self, method: Method, path: &str, body: Option<&T>) -> Result<U, ApiError>
    where
        T: Serialize + ?Sized,
        U: DeserializeOwned,
    {
        let builder = self.builder(method, path);
        let resp = match body {
            Some(b) => builder.json(b)?.send().await?,
            None => builder.send().await?,
        };
        read_json(resp).await
    }
}

/// Non-2xx becomes `ApiError::Status` carrying the raw body.
async fn read_json<U: DeserializeOwned>(resp: Response) -> Result<U, ApiError> {
    if !resp.ok() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        log::warn!("{} -> HTTP {status}", resp.url());
        return Err(ApiError::Status { status, body });
    }
    let text = resp.text().await?;
    // body-less 2xx replies still decode into `Ack`
    let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_with_single_slash() {
        assert_eq!(join_url("https://h", "/history"), "https://h/history");
        assert_eq!(join_url("https://h/", "/history"), "https://h/history");
        assert_eq!(join_url("https://h/", "history"), "https://h/history");
        assert_eq!(join_url("https://h", "escalate/7"), "https://h/escalate/7");
    }

    #[test]
    fn attaches_bearer_only_with_credential() {
        let anon = ApiClient::with_base("https://h", None);
        assert_eq!(anon.authorization(), None);

        let creds = Credentials::new("abc.def", "student");
        let authed = ApiClient::with_base("https://h", Some(&creds));
        assert_eq!(authed.authorization().as_deref(), Some("Bearer abc.def"));
        assert_eq!(authed.url("/tutor/pending"), "https://h/tutor/pending");
    }
}
