use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[allow(clippy::enum_variant_names)]
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid GraphQL response")]
    InvalidGraphqlResponse,
    #[error("Invalid cookie: {0}")]
    InvalidCookie(String),
    #[error("Unexpected status {0} from {1}")]
    UnexpectedStatus(reqwest::StatusCode, String),
    #[error("Tweet `{0}` has no text")]
    MissingText(String),
    #[error("Cannot encode/decode JSON: {0}")]
    JSONError(#[from] serde_json::Error),
    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Network Error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Invalid header value: {0}")]
    HeaderError(#[from] reqwest::header::InvalidHeaderValue),
    #[error("Cannot parse URL: {0}")]
    UrlError(#[from] url::ParseError),
    #[error("Parsing error: {0}")]
    ParsingError(#[from] xto_util::ParsingError),
}
