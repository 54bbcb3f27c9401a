//! Requests, responses and errors of the asset cache.

use thiserror::Error;
use url::Url;

/// Where a [`AssetCacheManager`](super::AssetCacheManager) is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Created, not yet installing.
    Parsed,
    Installing,
    /// Populated and waiting to be promoted.
    Installed,
    Activating,
    /// The current generation; routes requests.
    Active,
    /// A newer generation took over.
    Superseded,
    /// Installation failed; this generation is never promoted.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("Cache installation failed at {url}: {reason}")]
    InstallFailed { url: String, reason: String },

    #[error("No network response and no cached copy of {url}")]
    Miss { url: String },

    #[error("Network request failed: {0}")]
    Network(String),

    #[error("Cache storage error: {0}")]
    Storage(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Cannot {action} while {state:?}")]
    InvalidState {
        action: &'static str,
        state: LifecycleState,
    },
}

/// The fetch destination a browser reports for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Document,
    Script,
    Style,
    Image,
    Font,
    /// Anything else, including the empty destination of `fetch()` calls.
    Other,
}

impl Destination {
    pub fn from_fetch(destination: &str) -> Self {
        match destination {
            "document" | "iframe" | "frame" => Destination::Document,
            "script" | "worker" | "sharedworker" | "serviceworker" => Destination::Script,
            "style" => Destination::Style,
            "image" => Destination::Image,
            "font" => Destination::Font,
            _ => Destination::Other,
        }
    }
}

/// How a request is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Network, then cache: documents, scripts and styles.
    FreshnessFirst,
    /// Cache, then network: icons and other static media.
    AvailabilityFirst,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub url: Url,
    pub method: String,
    pub destination: Destination,
}

impl AssetRequest {
    pub fn new(url: &str, method: &str, destination: Destination) -> Result<Self, CacheError> {
        let url = Url::parse(url).map_err(|e| CacheError::InvalidUrl(format!("{url}: {e}")))?;
        Ok(Self {
            url,
            method: method.to_ascii_uppercase(),
            destination,
        })
    }

    pub fn get(url: &str, destination: Destination) -> Result<Self, CacheError> {
        Self::new(url, "GET", destination)
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Key under which the response is cached; fragments are ignored.
    pub fn cache_key(&self) -> String {
        cache_key(&self.url)
    }

    /// Route by destination, falling back to the path's extension.
    pub fn strategy(&self) -> Strategy {
        let fresh = match self.destination {
            Destination::Document | Destination::Script | Destination::Style => true,
            Destination::Image | Destination::Font => false,
            Destination::Other => {
                let path = self.url.path();
                let ext = path
                    .rsplit('/')
                    .next()
                    .and_then(|segment| segment.rsplit_once('.'))
                    .map(|(_, ext)| ext.to_ascii_lowercase());
                path.ends_with('/')
                    || matches!(ext.as_deref(), Some("html" | "htm" | "js" | "mjs" | "css"))
            }
        };
        if fresh {
            Strategy::FreshnessFirst
        } else {
            Strategy::AvailabilityFirst
        }
    }
}

pub(crate) fn cache_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.into()
}

/// Statuses whose responses must not carry a body.
const NULL_BODY_STATUSES: [u16; 5] = [101, 103, 204, 205, 304];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    pub status: u16,
    /// Header name and value pairs in the order the network sent them.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl AssetResponse {
    pub fn ok(content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            headers: vec![("content-type".to_string(), content_type.to_string())],
            body: body.into(),
        }
    }

    /// First value of the named header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the status forbids a body, so a rebuilt response must have none.
    pub fn has_null_body_status(&self) -> bool {
        NULL_BODY_STATUSES.contains(&self.status)
    }
}
