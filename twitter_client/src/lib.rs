pub mod bundle;
pub mod consts;
mod error;
pub mod operation;
mod response;
mod result;
pub mod transport;

use reqwest::{header, Url};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use consts::*;
use response::GraphqlResponse;
pub use response::Tweet;
pub use result::*;
pub use transport::{Fetch, FetchRequest, FetchResponse, HttpFetch};

pub use crate::error::Error;
pub use crate::error::Result;

use xto_util::parse_cookie_str;

#[derive(Debug, Clone)]
pub struct SessionCookie {
    pub ct0: String,
    pub auth_token: String,
}

impl Display for SessionCookie {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ct0={}; auth_token={}", self.ct0, self.auth_token)
    }
}

impl FromStr for SessionCookie {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut cookie_map = parse_cookie_str(s)?;
        let ct0 = cookie_map.remove("ct0").ok_or(Error::InvalidCookie(s.to_string()))?;
        let auth_token = cookie_map
            .remove("auth_token")
            .ok_or(Error::InvalidCookie(s.to_string()))?;
        Ok(SessionCookie { ct0, auth_token })
    }
}

impl SessionCookie {
    /// Put both cookies into `jar` for the host, as a logged-in page would have them.
    pub fn install(&self, jar: &reqwest::cookie::Jar) -> Result<()> {
        let origin = Url::parse(HOST_ORIGIN)?;
        jar.add_cookie_str(&format!("ct0={}; Domain=x.com; Path=/", self.ct0), &origin);
        jar.add_cookie_str(&format!("auth_token={}; Domain=x.com; Path=/", self.auth_token), &origin);
        Ok(())
    }
}

/// Client for the single tweet lookup, authenticated with the page's CSRF token.
#[derive(Clone)]
pub struct TwitterClient {
    fetch: Arc<dyn Fetch>,
    csrf_token: String,
    default_variables: serde_json::Map<String, Value>,
}

impl std::fmt::Debug for TwitterClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterClient").finish_non_exhaustive()
    }
}

impl TwitterClient {
    pub fn new(fetch: Arc<dyn Fetch>, csrf_token: impl Into<String>) -> TwitterClient {
        let default_variables = DEFAULT_TWEET_VARIABLES
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_owned().into()))
            .collect();

        TwitterClient {
            fetch,
            csrf_token: csrf_token.into(),
            default_variables,
        }
    }

    /// Look up one tweet through `TweetResultByRestId` with the given operation hash and
    /// serialized feature flags.
    pub async fn tweet_by_id(&self, hash: &str, features: &str, tweet_id: &str) -> Result<TweetRecord> {
        let response: GraphqlResponse = self
            .graphql_get(hash, TWEET_RESULT_OPERATION, features, [("tweetId", tweet_id)])
            .await?;
        let tweet = response.into_tweet().ok_or(Error::InvalidGraphqlResponse)?;
        tweet
            .to_record(tweet_id)
            .ok_or_else(|| Error::MissingText(tweet_id.to_string()))
    }
}

impl TwitterClient {
    fn headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, header::HeaderValue::from_static(BEARER_TOKEN));
        headers.insert("x-csrf-token", header::HeaderValue::from_str(&self.csrf_token)?);
        headers.insert("x-twitter-auth-type", header::HeaderValue::from_static("OAuth2Session"));
        headers.insert("x-twitter-active-user", header::HeaderValue::from_static("yes"));
        headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn graphql_get<I, V, R>(&self, hash: &str, endpoint: &str, features: &str, variables: I) -> Result<R>
    where
        I: IntoIterator<Item = (&'static str, V)>,
        V: Into<Value>,
        R: serde::de::DeserializeOwned,
    {
        let mut all_variables = self.default_variables.clone();
        all_variables.extend(variables.into_iter().map(|(k, v)| (k.to_string(), v.into())));
        let variable_str = serde_json::to_string(&all_variables)?;
        let graphql_params = [("variables", variable_str.as_str()), ("features", features)];

        let base_url = format!("{}/{}/{}", GRAPHQL_API, hash, endpoint);
        let url = Url::parse_with_params(&base_url, &graphql_params)?;
        let request = FetchRequest {
            url,
            headers: self.headers()?,
        };
        tracing::debug!("GET {} ({})", endpoint, hash);
        let response = self.fetch.fetch(request).await?.error_for_status()?;

        let content = response.text();
        log(endpoint, &content).await?;
        serde_json::from_str(&content).map_err(|e| e.into())
    }
}

/// Serialized form of the built-in feature flags, used when nothing better has been observed.
pub fn default_features() -> String {
    let features: serde_json::Map<String, Value> = DEFAULT_GRAPHQL_FEATURES
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_owned().into()))
        .collect();
    Value::Object(features).to_string()
}

async fn log(name: &str, content: &str) -> Result<()> {
    use std::path::PathBuf;
    use tokio::{fs::File, io::AsyncWriteExt};

    if let Ok(dir) = std::env::var("CLIENT_LOG_DIR") {
        let time = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let filepath = PathBuf::from(dir).join(format!("twitter_{}_{}.json", name, time));
        let mut file = File::create(filepath).await?;
        file.write_all(content.as_bytes()).await?;
    }
    Ok(())
}
