//
//  circleci
//  api/client.rs
//

//! # Core HTTP Client for the CircleCI v2 API
//!
//! This module is the only place in the crate that touches the wire. It
//! provides:
//!
//! - [`Config`]: partial configuration merged over defaults at construction
//! - [`Client`]: immutable client state plus the two primitive operations the
//!   resource services are allowed to use — [`Client::build_request`] and
//!   [`Client::execute`]
//! - [`Destination`]: the closed set of places a response body can go
//!
//! ## Wire conventions
//!
//! Every request carries `Circle-Token: <token>` and
//! `Accept: application/vnd.api+json`. Mutating requests add
//! `Content-Type: application/vnd.api+json` and a JSON body terminated by a
//! single newline. GET payloads are reflected into the query string; `None`
//! optional fields are omitted entirely, and sequence fields encode as one
//! key per element, in element order.
//!
//! The exact media type has varied across API revisions
//! (`application/json` vs `application/vnd.api+json`); it is a single
//! constant ([`MEDIA_TYPE`]) so it can track current API documentation.

use std::io::Write;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use super::common::{Error, ErrorResponse};
use super::query;

/// Default API origin.
pub const DEFAULT_ADDRESS: &str = "https://circleci.com";

/// Default versioned API prefix, resolved against the address.
pub const DEFAULT_BASE_PATH: &str = "/api/v2/";

/// Environment variable consulted for a token when none is configured.
pub const TOKEN_ENV: &str = "CIRCLECI_TOKEN";

/// The vendor JSON media type sent as both `Accept` and (for mutating
/// requests) `Content-Type`.
pub const MEDIA_TYPE: &str = "application/vnd.api+json";

const CIRCLE_TOKEN: HeaderName = HeaderName::from_static("circle-token");

/// Partial client configuration.
///
/// Every field is optional; unset fields fall back to defaults when the
/// client is constructed. Defaults are the public API origin
/// ([`DEFAULT_ADDRESS`]), the versioned prefix ([`DEFAULT_BASE_PATH`]), a
/// token read from [`TOKEN_ENV`], a `User-Agent: circleci-rs/<version>`
/// header, and a fresh transport.
///
/// `headers` are merged key-by-key over the defaults (a supplied key wins),
/// not replaced wholesale. The auth and `Accept` headers are applied after
/// all configured headers and cannot be overridden here.
///
/// Timeout policy belongs to the injected `http` transport; the core imposes
/// none of its own:
///
/// ```rust,no_run
/// use circleci::{Client, Config};
/// use std::time::Duration;
///
/// let client = Client::new(Config {
///     token: Some("your-token".to_string()),
///     http: Some(
///         reqwest::Client::builder()
///             .timeout(Duration::from_secs(30))
///             .build()?,
///     ),
///     ..Config::default()
/// })?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// API origin override, e.g. `https://circleci.example.com`.
    pub address: Option<String>,

    /// Base path override. A trailing `/` is appended if missing so that
    /// relative paths resolve under the prefix.
    pub base_path: Option<String>,

    /// API token override. Falls back to the `CIRCLECI_TOKEN` environment
    /// variable.
    pub token: Option<String>,

    /// Extra default headers, merged over the built-in defaults per key.
    pub headers: HeaderMap,

    /// Transport override. Supply a preconfigured `reqwest::Client` to
    /// control timeouts, proxies, or pooling.
    pub http: Option<reqwest::Client>,
}

/// Where a successful response body is written.
///
/// A closed variant set instead of runtime type inspection, so the
/// dispatcher's contract stays statically checkable.
pub enum Destination<'a, T = ()> {
    /// Decode the body as JSON into the referent. An empty body is tolerated
    /// as a no-op: the referent keeps the value it was seeded with. This
    /// accommodates endpoints that answer 200 with no body.
    Json(&'a mut T),

    /// Copy the body verbatim into the writer. For binary downloads such as
    /// job artifacts.
    Raw(&'a mut (dyn Write + Send)),

    /// Ignore the body. For delete/action endpoints with no meaningful
    /// response.
    Discard,
}

/// The CircleCI v2 API client.
///
/// Immutable after construction; concurrent calls need no locking. Each call
/// builds and consumes its own transient request state, and the underlying
/// `reqwest::Client` is safe for concurrent use.
///
/// Resource services are obtained from accessor methods:
///
/// ```rust,no_run
/// use circleci::{Client, Config};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), circleci::Error> {
/// let client = Client::new(Config::default())?;
/// let cancel = CancellationToken::new();
///
/// let pipeline = client.pipelines().get(&cancel, "pipeline-id").await?;
/// println!("state: {}", pipeline.state);
/// # Ok(())
/// # }
/// ```
pub struct Client {
    base_url: Url,
    token: HeaderValue,
    headers: HeaderMap,
    http: reqwest::Client,
}

impl Client {
    /// Builds a client by merging `config` over the defaults.
    ///
    /// No network I/O occurs here.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidAddress`] if the merged address does not parse as an
    ///   absolute URL
    /// - [`Error::MissingToken`] if no token is configured, `CIRCLECI_TOKEN`
    ///   is unset or empty, or the token is not a valid header value
    pub fn new(config: Config) -> Result<Self, Error> {
        let address = config
            .address
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());

        let mut base_path = config
            .base_path
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_PATH.to_string());
        if !base_path.ends_with('/') {
            base_path.push('/');
        }

        let token = config
            .token
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var(TOKEN_ENV).ok())
            .filter(|t| !t.is_empty())
            .ok_or(Error::MissingToken)?;
        let mut token = HeaderValue::from_str(&token).map_err(|_| Error::MissingToken)?;
        token.set_sensitive(true);

        let base_url = Url::parse(&address)
            .and_then(|u| u.join(&base_path))
            .map_err(Error::InvalidAddress)?;

        let mut headers = HeaderMap::new();
        let user_agent = format!("circleci-rs/{}", crate::VERSION);
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_str(&user_agent).map_err(|_| Error::MissingToken)?,
        );
        for (name, value) in config.headers.iter() {
            headers.insert(name, value.clone());
        }

        Ok(Self {
            base_url,
            token,
            headers,
            http: config.http.unwrap_or_default(),
        })
    }

    /// The resolved base URL (address + base path) requests are built
    /// against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds a fully-formed HTTP request for `path` relative to the base
    /// URL.
    ///
    /// For `GET`, a payload is reflected into query parameters via its serde
    /// field names; `None` optionals are omitted and sequences encode as
    /// repeated keys. For mutating verbs, a payload becomes a JSON body with
    /// a single trailing newline and the vendor `Content-Type`.
    ///
    /// Building is deterministic: identical inputs produce identical
    /// requests, header-for-header and body-for-body.
    ///
    /// # Errors
    ///
    /// - [`Error::BadPath`] if `path` cannot be resolved against the base URL
    /// - [`Error::Serialization`] if the payload cannot be encoded
    pub fn build_request<P>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&P>,
    ) -> Result<Request, Error>
    where
        P: Serialize + ?Sized,
    {
        let mut url = self.base_url.join(path).map_err(Error::BadPath)?;
        let mut headers = self.headers.clone();
        let mut body: Option<Vec<u8>> = None;

        if method == Method::GET {
            if let Some(payload) = payload {
                let pairs = query::encode(payload)?;
                if !pairs.is_empty() {
                    let mut serializer = url.query_pairs_mut();
                    for (key, value) in &pairs {
                        serializer.append_pair(key, value);
                    }
                }
            }
        } else if let Some(payload) = payload {
            // serde_json never HTML-escapes `<`, `>` or `&`; the trailing
            // newline matches what the API's reference encoder emits.
            let mut buf = serde_json::to_vec(payload).map_err(Error::Serialization)?;
            buf.push(b'\n');
            body = Some(buf);
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(MEDIA_TYPE));
        }

        // Auth and Accept go last: configured defaults must not override
        // them.
        headers.insert(CIRCLE_TOKEN, self.token.clone());
        headers.insert(header::ACCEPT, HeaderValue::from_static(MEDIA_TYPE));

        let mut request = Request::new(method, url);
        *request.headers_mut() = headers;
        if let Some(body) = body {
            *request.body_mut() = Some(body.into());
        }

        Ok(request)
    }

    /// Dispatches `request` and writes a successful body into `destination`.
    ///
    /// Cancellation is observed before the call (fails fast when the token is
    /// already triggered) and while the call is in flight. A transport
    /// failure that coincides with a triggered token reports as
    /// [`Error::Cancelled`] rather than [`Error::Transport`].
    ///
    /// Status mapping: 2xx is success; 401 → [`Error::Unauthorized`] and
    /// 404 → [`Error::NotFound`] without reading the body; any other status
    /// decodes the `{"message": …}` envelope, falling back to the HTTP status
    /// line when the envelope is absent or malformed.
    ///
    /// No retries are performed.
    pub async fn execute<T>(
        &self,
        cancel: &CancellationToken,
        request: Request,
        destination: Destination<'_, T>,
    ) -> Result<(), Error>
    where
        T: DeserializeOwned,
    {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        debug!(method = %request.method(), url = %request.url(), "dispatching request");

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            result = self.http.execute(request) => match result {
                Ok(response) => response,
                Err(_) if cancel.is_cancelled() => return Err(Error::Cancelled),
                Err(err) => return Err(Error::Transport(err)),
            },
        };

        let status = response.status();
        debug!(status = %status, "received response");

        if !status.is_success() {
            return Err(read_error(status, response).await);
        }

        match destination {
            Destination::Discard => Ok(()),
            Destination::Raw(writer) => {
                let bytes = response.bytes().await.map_err(Error::Transport)?;
                writer.write_all(&bytes)?;
                Ok(())
            }
            Destination::Json(value) => {
                let bytes = response.bytes().await.map_err(Error::Transport)?;
                if bytes.is_empty() {
                    return Ok(());
                }
                *value = serde_json::from_slice(&bytes).map_err(Error::Serialization)?;
                Ok(())
            }
        }
    }
}

/// Maps a non-2xx response to an error. 401 and 404 have fixed variants and
/// skip the body entirely.
async fn read_error(status: StatusCode, response: Response) -> Error {
    match status {
        StatusCode::UNAUTHORIZED => Error::Unauthorized,
        StatusCode::NOT_FOUND => Error::NotFound,
        _ => match response.json::<ErrorResponse>().await {
            Ok(envelope) if !envelope.message.is_empty() => Error::Api(envelope.message),
            _ => Error::Api(status_line(status)),
        },
    }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testutil::test_client;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Default)]
    struct ListOptions {
        #[serde(rename = "owner-slug", skip_serializing_if = "Option::is_none")]
        owner_slug: Option<String>,
        #[serde(rename = "owner-id", skip_serializing_if = "Option::is_none")]
        owner_id: Option<String>,
        #[serde(rename = "page-token", skip_serializing_if = "Option::is_none")]
        page_token: Option<String>,
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Payload {
        id: String,
        name: String,
    }

    fn token_client(token: Option<&str>) -> Result<Client, Error> {
        Client::new(Config {
            token: token.map(str::to_string),
            ..Config::default()
        })
    }

    #[test]
    fn test_new_missing_token() {
        std::env::remove_var(TOKEN_ENV);
        assert!(matches!(token_client(None), Err(Error::MissingToken)));
        assert!(matches!(token_client(Some("")), Err(Error::MissingToken)));
    }

    #[test]
    fn test_new_invalid_address() {
        let result = Client::new(Config {
            address: Some("://not-a-url".to_string()),
            token: Some("fake-token".to_string()),
            ..Config::default()
        });
        assert!(matches!(result, Err(Error::InvalidAddress(_))));
    }

    #[test]
    fn test_new_default_base_url() {
        let client = token_client(Some("fake-token")).unwrap();
        assert_eq!(client.base_url().as_str(), "https://circleci.com/api/v2/");
    }

    #[test]
    fn test_new_appends_base_path_slash() {
        let client = Client::new(Config {
            address: Some("https://circleci.example.com".to_string()),
            base_path: Some("/api/v2".to_string()),
            token: Some("fake-token".to_string()),
            ..Config::default()
        })
        .unwrap();
        assert_eq!(
            client.base_url().as_str(),
            "https://circleci.example.com/api/v2/"
        );
    }

    #[test]
    fn test_headers_merge_and_core_headers_win() {
        let mut extra = HeaderMap::new();
        extra.insert(header::USER_AGENT, HeaderValue::from_static("custom-agent"));
        extra.insert(header::ACCEPT, HeaderValue::from_static("text/plain"));
        extra.insert("x-team", HeaderValue::from_static("platform"));

        let client = Client::new(Config {
            token: Some("fake-token".to_string()),
            headers: extra,
            ..Config::default()
        })
        .unwrap();

        let request = client
            .build_request::<()>(Method::GET, "me", None)
            .unwrap();
        let headers = request.headers();

        // Configured defaults override built-in defaults per key.
        assert_eq!(headers.get(header::USER_AGENT).unwrap(), "custom-agent");
        assert_eq!(headers.get("x-team").unwrap(), "platform");
        // The auth and Accept headers always win.
        assert_eq!(headers.get(header::ACCEPT).unwrap(), MEDIA_TYPE);
        assert_eq!(headers.get(CIRCLE_TOKEN).unwrap(), "fake-token");
    }

    #[test]
    fn test_build_request_get_query() {
        let client = token_client(Some("fake-token")).unwrap();
        let options = ListOptions {
            owner_slug: Some("org".to_string()),
            ..ListOptions::default()
        };

        let request = client
            .build_request(Method::GET, "context", Some(&options))
            .unwrap();

        assert_eq!(request.url().query(), Some("owner-slug=org"));
        assert!(request.body().is_none());
    }

    #[test]
    fn test_build_request_get_without_payload_has_no_query() {
        let client = token_client(Some("fake-token")).unwrap();
        let request = client
            .build_request::<()>(Method::GET, "me", None)
            .unwrap();
        assert_eq!(request.url().query(), None);
        assert_eq!(request.url().path(), "/api/v2/me");
    }

    #[test]
    fn test_build_request_post_body() {
        #[derive(Serialize)]
        struct Body {
            name: String,
        }

        let client = token_client(Some("fake-token")).unwrap();
        let body = Body {
            name: "a <b> & c".to_string(),
        };
        let request = client
            .build_request(Method::POST, "context", Some(&body))
            .unwrap();

        let bytes = request.body().unwrap().as_bytes().unwrap();
        let text = std::str::from_utf8(bytes).unwrap();

        // Exactly one trailing newline, no HTML escaping.
        assert_eq!(text, "{\"name\":\"a <b> & c\"}\n");
        assert_eq!(
            request.headers().get(header::CONTENT_TYPE).unwrap(),
            MEDIA_TYPE
        );
    }

    #[test]
    fn test_build_request_is_deterministic() {
        let client = token_client(Some("fake-token")).unwrap();
        let options = ListOptions {
            owner_slug: Some("org".to_string()),
            page_token: Some("cursor".to_string()),
            ..ListOptions::default()
        };

        let a = client
            .build_request(Method::GET, "context", Some(&options))
            .unwrap();
        let b = client
            .build_request(Method::GET, "context", Some(&options))
            .unwrap();

        assert_eq!(a.url(), b.url());
        assert_eq!(a.headers(), b.headers());
        assert_eq!(a.method(), b.method());
    }

    #[test]
    fn test_build_request_resolves_slug_segments() {
        let client = token_client(Some("fake-token")).unwrap();
        let request = client
            .build_request::<()>(Method::GET, "project/gh/acme/widget", None)
            .unwrap();
        assert_eq!(request.url().path(), "/api/v2/project/gh/acme/widget");
    }

    #[tokio::test]
    async fn test_execute_unauthorized_ignores_body() {
        let (mut server, client) = test_client().await;
        let mock = server
            .mock("GET", "/api/v2/me")
            .with_status(401)
            .with_body("this is not json {{{")
            .create_async()
            .await;

        let cancel = CancellationToken::new();
        let request = client.build_request::<()>(Method::GET, "me", None).unwrap();
        let mut payload = Payload::default();
        let err = client
            .execute(&cancel, request, Destination::Json(&mut payload))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Unauthorized));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_execute_not_found_ignores_body() {
        let (mut server, client) = test_client().await;
        let mock = server
            .mock("GET", "/api/v2/me")
            .with_status(404)
            .with_body(r#"{"message": "should be ignored"}"#)
            .create_async()
            .await;

        let cancel = CancellationToken::new();
        let request = client.build_request::<()>(Method::GET, "me", None).unwrap();
        let err = client
            .execute::<()>(&cancel, request, Destination::Discard)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotFound));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_execute_decodes_error_envelope() {
        let (mut server, client) = test_client().await;
        let mock = server
            .mock("GET", "/api/v2/me")
            .with_status(422)
            .with_body(r#"{"message":"bad field"}"#)
            .create_async()
            .await;

        let cancel = CancellationToken::new();
        let request = client.build_request::<()>(Method::GET, "me", None).unwrap();
        let err = client
            .execute::<()>(&cancel, request, Destination::Discard)
            .await
            .unwrap_err();

        match err {
            Error::Api(message) => assert_eq!(message, "bad field"),
            other => panic!("expected Api error, got {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_execute_falls_back_to_status_line() {
        let (mut server, client) = test_client().await;
        let mock = server
            .mock("GET", "/api/v2/me")
            .with_status(500)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let cancel = CancellationToken::new();
        let request = client.build_request::<()>(Method::GET, "me", None).unwrap();
        let err = client
            .execute::<()>(&cancel, request, Destination::Discard)
            .await
            .unwrap_err();

        match err {
            Error::Api(message) => assert_eq!(message, "500 Internal Server Error"),
            other => panic!("expected Api error, got {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_execute_tolerates_empty_body() {
        let (mut server, client) = test_client().await;
        let mock = server
            .mock("GET", "/api/v2/me")
            .with_status(200)
            .create_async()
            .await;

        let cancel = CancellationToken::new();
        let request = client.build_request::<()>(Method::GET, "me", None).unwrap();
        let mut payload = Payload::default();
        client
            .execute(&cancel, request, Destination::Json(&mut payload))
            .await
            .unwrap();

        assert_eq!(payload, Payload::default());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_execute_decodes_json_destination() {
        let (mut server, client) = test_client().await;
        let mock = server
            .mock("GET", "/api/v2/me")
            .with_status(200)
            .with_body(r#"{"id": "u1", "name": "Jane"}"#)
            .create_async()
            .await;

        let cancel = CancellationToken::new();
        let request = client.build_request::<()>(Method::GET, "me", None).unwrap();
        let mut payload = Payload::default();
        client
            .execute(&cancel, request, Destination::Json(&mut payload))
            .await
            .unwrap();

        assert_eq!(payload.id, "u1");
        assert_eq!(payload.name, "Jane");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_execute_copies_raw_body() {
        let (mut server, client) = test_client().await;
        let mock = server
            .mock("GET", "/api/v2/artifact.bin")
            .with_status(200)
            .with_body(&[0u8, 159, 146, 150])
            .create_async()
            .await;

        let cancel = CancellationToken::new();
        let request = client
            .build_request::<()>(Method::GET, "artifact.bin", None)
            .unwrap();
        let mut sink: Vec<u8> = Vec::new();
        client
            .execute::<()>(&cancel, request, Destination::Raw(&mut sink))
            .await
            .unwrap();

        assert_eq!(sink, [0u8, 159, 146, 150]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_execute_fails_fast_when_already_cancelled() {
        let client = token_client(Some("fake-token")).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let request = client.build_request::<()>(Method::GET, "me", None).unwrap();
        let err = client
            .execute::<()>(&cancel, request, Destination::Discard)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
    }

    #[tokio::test]
    async fn test_execute_surfaces_cancellation_in_flight() {
        // A listener that accepts but never answers keeps the transport call
        // pending until the token fires.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client = Client::new(Config {
            address: Some(format!("http://{addr}")),
            token: Some("fake-token".to_string()),
            ..Config::default()
        })
        .unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let request = client.build_request::<()>(Method::GET, "me", None).unwrap();
        let err = client
            .execute::<()>(&cancel, request, Destination::Discard)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Cancelled));
    }

    #[test]
    fn test_status_line() {
        assert_eq!(
            status_line(StatusCode::INTERNAL_SERVER_ERROR),
            "500 Internal Server Error"
        );
        assert_eq!(status_line(StatusCode::from_u16(599).unwrap()), "599");
    }
}
