use twitter_client::{MediaEntity, TweetRecord, UrlEntity};

/// Expand short links and drop trailing media links from a post's text.
///
/// Each short URL present in the text is replaced by its expanded form, else its display
/// form. Each media short URL present is removed and the text trimmed, since media are
/// exported separately. The same inputs always give the same output, whichever API the
/// record came from.
pub fn resolve_text(text: &str, urls: &[UrlEntity], media: &[MediaEntity]) -> String {
    let mut text = text.to_string();

    for entity in urls {
        let Some(short) = entity.url.as_deref().filter(|u| !u.is_empty()) else {
            continue;
        };
        if !text.contains(short) {
            continue;
        }
        let long = entity
            .expanded_url
            .as_deref()
            .or(entity.display_url.as_deref())
            .unwrap_or(short);
        text = text.replacen(short, long, 1);
    }

    for entity in media {
        let Some(short) = entity.url.as_deref().filter(|u| !u.is_empty()) else {
            continue;
        };
        if text.contains(short) {
            text = text.replacen(short, "", 1).trim().to_string();
        }
    }

    text
}

pub fn resolve_record(record: &TweetRecord) -> String {
    resolve_text(&record.text, &record.urls, &record.media)
}
