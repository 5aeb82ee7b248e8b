use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError, VecSkipError};

// Entities

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlEntity {
    pub url: Option<String>,
    pub expanded_url: Option<String>,
    pub display_url: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaEntity {
    pub url: Option<String>,
    pub media_url_https: Option<String>,
}

#[serde_as]
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Entities {
    #[serde_as(as = "DefaultOnError<VecSkipError<_>>")]
    #[serde(default)]
    pub urls: Vec<UrlEntity>,
    #[serde_as(as = "DefaultOnError<VecSkipError<_>>")]
    #[serde(default)]
    pub media: Vec<MediaEntity>,
}

#[serde_as]
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct EntitySet {
    #[serde_as(as = "DefaultOnError<VecSkipError<_>>")]
    #[serde(default)]
    pub urls: Vec<UrlEntity>,
}

// Tweet

#[serde_as]
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct LegacyTweet {
    pub id_str: Option<String>,
    pub full_text: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub entities: Entities,
}

#[serde_as]
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct NoteTweetResult {
    pub text: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub entity_set: Option<EntitySet>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct NoteTweetResults {
    pub result: Option<NoteTweetResult>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct NoteTweet {
    pub note_tweet_results: Option<NoteTweetResults>,
}

#[serde_as]
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Tweet {
    pub rest_id: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub legacy: Option<LegacyTweet>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub note_tweet: Option<NoteTweet>,
}

/// `TweetWithVisibilityResults` nests the tweet one level deeper; plain results do not.
#[allow(clippy::large_enum_variant)]
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum TweetVariation {
    WithVisibilityResults { tweet: Tweet },
    Tweet(Tweet),
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TweetResult {
    pub result: Option<TweetVariation>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Data {
    #[serde(rename = "tweetResult")]
    pub tweet_result_camel: Option<TweetResult>,
    #[serde(rename = "tweet_result")]
    pub tweet_result_snake: Option<TweetResult>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GraphqlResponse {
    pub data: Option<Data>,
}
