use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[allow(clippy::enum_variant_names)]
#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing credential cookie `{0}`")]
    MissingCredential(String),
    #[error("No operation hash known for {0}")]
    MissingOperationHash(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Client error: {0}")]
    ClientError(#[from] twitter_client::Error),
    #[error("Cannot parse URL: {0}")]
    UrlError(#[from] url::ParseError),
}
