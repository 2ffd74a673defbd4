//! Request builder and response handling
//!
//! A `Request` is built once, prepared into a `PreparedRequest`, and handed
//! to a `Transport` as many times as the retry policy allows. The body is
//! read in the shape the request declares: plain text, or a strictly decoded
//! record.

use std::fmt;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use super::errors::{TransportError, TransportResult};
use super::retry::RetryPolicy;
use crate::decode::StrictDecoder;
use crate::schema::Record;

/// HTTP status with no body
pub const NO_CONTENT: u16 = 204;

/// HTTP methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
    Connect,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Connect => "CONNECT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a response body is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseShape {
    /// UTF-8 text, returned as-is
    #[default]
    Text,
    /// JSON decoded with exact key-set matching
    Strict,
}

impl fmt::Display for ResponseShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseShape::Text => write!(f, "text"),
            ResponseShape::Strict => write!(f, "strict JSON"),
        }
    }
}

/// What a transport puts on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
}

impl PreparedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and body of one exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Performs one HTTP exchange.
///
/// Implementations only report what the server said; status handling and
/// retries live in `Request`.
pub trait Transport {
    fn send(&self, request: &PreparedRequest) -> TransportResult<RawResponse>;

    /// Blocks between retries.
    fn pause(&self, wait: Duration) {
        thread::sleep(wait);
    }
}

/// An HTTP request with its retry policy and declared response shape
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: String,
    token: Option<String>,
    query: Vec<(String, String)>,
    retry: RetryPolicy,
    shape: ResponseShape,
    decoder: StrictDecoder,
}

macro_rules! method_constructors {
    ($($name:ident => $method:ident),* $(,)?) => {
        $(
            pub fn $name(url: impl Into<String>) -> Self {
                Self::new(Method::$method, url)
            }
        )*
    };
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            token: None,
            query: Vec::new(),
            retry: RetryPolicy::default(),
            shape: ResponseShape::default(),
            decoder: StrictDecoder::default(),
        }
    }

    method_constructors! {
        get => Get,
        post => Post,
        put => Put,
        patch => Patch,
        delete => Delete,
        head => Head,
        options => Options,
        trace => Trace,
        connect => Connect,
    }

    /// Sends `Authorization: Bearer <token>`.
    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets a query parameter, replacing an earlier value for the same key.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.query.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.query.push((key, value)),
        }
        self
    }

    pub fn query_pairs<K, V>(self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .fold(self, |request, (key, value)| request.query(key, value))
    }

    pub fn retries(mut self, max_retries: u32) -> Self {
        self.retry = RetryPolicy::with_retries(max_retries);
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Declares that the body is read with `strict`.
    pub fn expect_strict(mut self) -> Self {
        self.shape = ResponseShape::Strict;
        self
    }

    /// Declares that the body is read with `text`. This is the default.
    pub fn expect_text(mut self) -> Self {
        self.shape = ResponseShape::Text;
        self
    }

    pub fn decoder(mut self, decoder: StrictDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn shape(&self) -> ResponseShape {
        self.shape
    }

    pub fn prepare(&self) -> TransportResult<PreparedRequest> {
        if self.url.trim().is_empty() {
            return Err(TransportError::InvalidRequest("url is empty".into()));
        }

        let mut headers = Vec::new();
        if let Some(token) = &self.token {
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        Ok(PreparedRequest {
            method: self.method,
            url: self.url.clone(),
            headers,
            query: self.query.clone(),
        })
    }

    /// Sends the request and returns the body as text.
    ///
    /// Returns `Ok(None)` for 204 No Content.
    pub fn text<T: Transport + ?Sized>(&self, transport: &T) -> TransportResult<Option<String>> {
        self.require_shape(ResponseShape::Text)?;
        match self.execute(transport)? {
            Some(body) => Ok(Some(String::from_utf8(body)?)),
            None => Ok(None),
        }
    }

    /// Sends the request and strictly decodes the body into `R`.
    ///
    /// Returns `Ok(None)` for 204 No Content.
    pub fn strict<R: Record, T: Transport + ?Sized>(
        &self,
        transport: &T,
    ) -> TransportResult<Option<R>> {
        self.require_shape(ResponseShape::Strict)?;
        match self.execute(transport)? {
            Some(body) => Ok(Some(self.decoder.decode::<R>(&body)?)),
            None => Ok(None),
        }
    }

    fn require_shape(&self, requested: ResponseShape) -> TransportResult<()> {
        if self.shape != requested {
            return Err(TransportError::ShapeMismatch {
                declared: self.shape,
                requested,
            });
        }
        Ok(())
    }

    fn execute<T: Transport + ?Sized>(&self, transport: &T) -> TransportResult<Option<Vec<u8>>> {
        let prepared = self.prepare()?;
        let mut attempted = 0;

        loop {
            let response = transport.send(&prepared)?;
            debug!(
                method = %prepared.method,
                url = %prepared.url,
                status = response.status,
                "response received"
            );

            if response.status == NO_CONTENT {
                return Ok(None);
            }

            if self.retry.should_retry(response.status, attempted) {
                attempted += 1;
                let wait = self.retry.backoff(attempted);
                warn!(
                    status = response.status,
                    attempt = attempted,
                    max_retries = self.retry.max_retries(),
                    wait = ?wait,
                    "transient failure, retrying"
                );
                transport.pause(wait);
                continue;
            }

            if response.status >= 400 {
                return Err(TransportError::Status {
                    status: response.status,
                    body: String::from_utf8_lossy(&response.body).into_owned(),
                });
            }

            return Ok(Some(response.body));
        }
    }
}
