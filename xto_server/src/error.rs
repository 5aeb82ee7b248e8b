use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use xto_core::Error as CoreError;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug)]
pub struct ServerError(anyhow::Error);

impl<E> From<E> for ServerError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!("{}", self);
        let status = self.status_code();
        (status, self.to_string()).into_response()
    }
}

impl ServerError {
    fn status_code(&self) -> StatusCode {
        for cause in self.0.chain() {
            if let Some(err) = cause.downcast_ref::<twitter_client::Error>() {
                return client_status(err);
            }
            if let Some(err) = cause.downcast_ref::<CoreError>() {
                match err {
                    CoreError::MissingCredential(_) => return StatusCode::UNAUTHORIZED,
                    CoreError::Timeout(_) => return StatusCode::GATEWAY_TIMEOUT,
                    CoreError::UrlError(_) => return StatusCode::BAD_REQUEST,
                    CoreError::ClientError(err) => return client_status(err),
                    _ => return StatusCode::INTERNAL_SERVER_ERROR,
                }
            }
            if cause.downcast_ref::<url::ParseError>().is_some() {
                return StatusCode::BAD_REQUEST;
            }
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn client_status(err: &twitter_client::Error) -> StatusCode {
    match err {
        twitter_client::Error::InvalidGraphqlResponse => StatusCode::BAD_GATEWAY,
        twitter_client::Error::InvalidCookie(_) => StatusCode::BAD_REQUEST,
        twitter_client::Error::UnexpectedStatus(..) => StatusCode::BAD_GATEWAY,
        twitter_client::Error::NetworkError(_) => StatusCode::BAD_GATEWAY,
        twitter_client::Error::UrlError(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
