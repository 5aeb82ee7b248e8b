use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::response::{GraphqlResponse, Tweet, TweetVariation};
pub use crate::response::{MediaEntity, UrlEntity};

/// A post record reduced to what text resolution needs, whichever API it came from.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TweetRecord {
    pub id: String,
    pub text: String,
    pub urls: Vec<UrlEntity>,
    pub media: Vec<MediaEntity>,
}

// MARK: Helpers

impl Tweet {
    /// Identifier carried by the record itself.
    pub fn id(&self) -> Option<&str> {
        self.legacy
            .as_ref()
            .and_then(|legacy| legacy.id_str.as_deref())
            .or(self.rest_id.as_deref())
    }

    /// Full text of a long-form note, if the record carries one.
    fn note_text(&self) -> Option<(&str, Option<&[UrlEntity]>)> {
        let note = self
            .note_tweet
            .as_ref()?
            .note_tweet_results
            .as_ref()?
            .result
            .as_ref()?;
        let text = note.text.as_deref()?;
        Some((text, note.entity_set.as_ref().map(|set| set.urls.as_slice())))
    }

    /// Build a record under `id`. The note text wins over the truncated legacy text;
    /// each text brings its own URL entities, media always come from the legacy entities.
    /// A record whose chosen text is empty has nothing to resolve and yields `None`.
    pub fn to_record(&self, id: &str) -> Option<TweetRecord> {
        let legacy = self.legacy.as_ref();
        let legacy_urls = legacy.map(|l| l.entities.urls.as_slice()).unwrap_or_default();
        let media = legacy.map(|l| l.entities.media.clone()).unwrap_or_default();

        let (text, urls) = match self.note_text() {
            Some((text, note_urls)) => (text, note_urls.unwrap_or(legacy_urls)),
            None => (legacy?.full_text.as_deref()?, legacy_urls),
        };
        if text.is_empty() {
            return None;
        }

        Some(TweetRecord {
            id: id.to_string(),
            text: text.to_string(),
            urls: urls.to_vec(),
            media,
        })
    }
}

impl TweetVariation {
    pub fn into_tweet(self) -> Tweet {
        match self {
            TweetVariation::Tweet(tweet) => tweet,
            TweetVariation::WithVisibilityResults { tweet } => tweet,
        }
    }
}

impl GraphqlResponse {
    /// The tweet of a `TweetResultByRestId` response. The result key has been seen
    /// both as `tweetResult` and `tweet_result`.
    pub fn into_tweet(self) -> Option<Tweet> {
        let data = self.data?;
        data.tweet_result_camel
            .and_then(|r| r.result)
            .or_else(|| data.tweet_result_snake.and_then(|r| r.result))
            .map(TweetVariation::into_tweet)
    }
}

// MARK: Conversions

impl Tweet {
    /// Whether a node of an arbitrary API payload looks like a post record:
    /// a `legacy` object with a string `id_str` and a string `full_text`.
    pub fn is_record(value: &Value) -> bool {
        value
            .get("legacy")
            .filter(|legacy| legacy.is_object())
            .map(|legacy| {
                legacy.get("id_str").is_some_and(Value::is_string)
                    && legacy.get("full_text").is_some_and(Value::is_string)
            })
            .unwrap_or(false)
    }

    pub fn from_json(value: &Value) -> Result<Self, Error> {
        Tweet::deserialize(value).map_err(Error::from)
    }
}
