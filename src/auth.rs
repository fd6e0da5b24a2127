use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue, USER_AGENT};
use tracing::debug;

/// Header carrying the static API key.
pub const API_KEY_HEADER: &str = "x-api-key";

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_5) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/13.1.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:77.0) Gecko/20100101 Firefox/77.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/83.0.4103.97 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:77.0) Gecko/20100101 Firefox/77.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/83.0.4103.97 Safari/537.36",
];

/// Request authentication for the booking API
pub struct ApiKeyAuth {
    api_key: HeaderValue,
}

impl ApiKeyAuth {
    pub fn new(api_key: &str) -> Result<Self, InvalidHeaderValue> {
        let mut value = HeaderValue::from_str(api_key)?;
        value.set_sensitive(true);
        Ok(Self { api_key: value })
    }

    /// Pick a browser User-Agent for the next request
    pub fn random_user_agent() -> &'static str {
        USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0])
    }

    /// Headers attached to every request
    pub fn headers(&self) -> HeaderMap {
        let user_agent = Self::random_user_agent();
        debug!("Using User-Agent: {}", user_agent);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, self.api_key.clone());
        headers.insert(USER_AGENT, HeaderValue::from_static(user_agent));
        headers
    }
}
