pub const HOST_ORIGIN: &str = "https://x.com";
pub const GRAPHQL_API: &str = "https://x.com/i/api/graphql";
/// Substring that marks a request as host API traffic.
pub const API_PATH_MARKER: &str = "/i/api/";
pub const BEARER_TOKEN: &str =
    "Bearer AAAAAAAAAAAAAAAAAAAAANRILgAAAAAAnNwIzUejRCOuH5E6I8xnZz4puTs%3D1Zv7ttfk8LF81IUq16cHjhLTvJu4FA33AGWWjCpTnA";
pub const CSRF_COOKIE: &str = "ct0";

pub const TWEET_RESULT_OPERATION: &str = "TweetResultByRestId";

/// Operations whose live hash can be reused for a single tweet lookup, in order of preference.
pub const HASH_OPERATION_PRIORITY: &[&str] = &["TweetResultByRestId", "TweetDetail", "TimelineTweetDetail"];
/// Operations whose live feature string is accepted by a single tweet lookup, in order of preference.
pub const FEATURE_OPERATION_PRIORITY: &[&str] = &["TweetResultByRestId", "TweetDetail", "HomeTimeline"];

pub const DEFAULT_TRUSTED_SCRIPT_HOSTS: &[&str] = &["twimg.com", "x.com"];
/// A key that only appears inside the feature flag object of the client bundles.
pub const FEATURE_MARKER: &str = "longform_notetweets_consumption_enabled";
/// Maximum distance between `queryId` and `operationName` in a bundled operation descriptor.
pub const QUERY_ID_WINDOW: usize = 80;

pub const DEFAULT_TWEET_VARIABLES: &[(&str, bool)] = &[
    ("withCommunity", false),
    ("includePromotedContent", false),
    ("withVoice", false),
];

pub const DEFAULT_GRAPHQL_FEATURES: &[(&str, bool)] = &[
    ("longform_notetweets_consumption_enabled", true),
    ("longform_notetweets_rich_text_read_enabled", true),
    ("longform_notetweets_inline_media_enabled", true),
    ("responsive_web_graphql_exclude_directive_enabled", true),
    ("verified_phone_label_enabled", false),
    (
        "responsive_web_graphql_skip_user_profile_image_extensions_enabled",
        false,
    ),
    ("responsive_web_graphql_timeline_navigation_enabled", true),
    ("creator_subscriptions_tweet_preview_api_enabled", true),
    ("c9s_tweet_anatomy_moderator_badge_enabled", true),
    ("tweetypie_unmention_optimization_enabled", true),
    ("responsive_web_edit_tweet_api_enabled", true),
    ("graphql_is_translatable_rweb_tweet_is_translatable_enabled", true),
    ("view_counts_everywhere_api_enabled", true),
    ("freedom_of_speech_not_reach_fetch_enabled", true),
    ("standardized_nudges_misinfo", true),
    (
        "tweet_with_visibility_results_prefer_gql_limited_actions_policy_enabled",
        true,
    ),
    ("rweb_video_timestamps_enabled", true),
    ("tweet_awards_web_tipping_enabled", false),
    ("responsive_web_twitter_article_tweet_consumption_enabled", true),
    ("responsive_web_enhance_cards_enabled", false),
    ("rweb_tipjar_consumption_enabled", true),
    ("creator_subscriptions_quote_tweet_preview_enabled", false),
    ("communities_web_enable_tweet_community_results_fetch", true),
    ("articles_preview_enabled", true),
];
