use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;

use crate::consts::API_PATH_MARKER;

lazy_static! {
    static ref GRAPHQL_PATH: Regex = Regex::new(r"/graphql/([^/]+)/(\w+)").unwrap();
}

/// Parameters of a GraphQL operation as seen on a live request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedOperation {
    pub name: String,
    pub hash: String,
    /// Raw `features` query parameter, empty when the request carried none.
    pub features: String,
}

pub fn is_api_request(url: &Url) -> bool {
    url.as_str().contains(API_PATH_MARKER)
}

/// Read operation name, hash and feature flags from a `.../graphql/{hash}/{operationName}` URL.
pub fn parse_operation(url: &Url) -> Option<ObservedOperation> {
    let captures = GRAPHQL_PATH.captures(url.path())?;
    let features = url
        .query_pairs()
        .find(|(key, _)| key == "features")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default();
    Some(ObservedOperation {
        hash: captures[1].to_string(),
        name: captures[2].to_string(),
        features,
    })
}
