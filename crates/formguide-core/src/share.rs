//! Share links
//!
//! A share link is any URL whose query string carries the whole item list as
//! a codec token in the `data` parameter. Receiving a link never touches the
//! store directly: it yields a [`ShareOutcome`], and a usable link has to be
//! confirmed by the caller (`ItemStore::confirm_share`) before it overwrites
//! the current list.
//!
//! Whatever the outcome, `clean_url` is the link with the parameter removed,
//! so the caller can forget the token once it has been handled.

use url::Url;

use crate::codec;
use crate::error::DecodeError;
use crate::models::Item;

/// Query parameter carrying the token
pub const SHARE_PARAM: &str = "data";

/// Errors building or reading share links
#[derive(thiserror::Error, Debug)]
pub enum ShareError {
    #[error("Invalid share URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Items decoded from a link, waiting for the user to accept the overwrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareIntent {
    pub items: Vec<Item>,
    pub clean_url: String,
}

/// Result of inspecting a URL for a share token
#[derive(Debug)]
pub enum ShareOutcome {
    /// The URL carries no token
    NoShare,
    /// The token could not be decoded; existing state must stay untouched
    Unusable { error: DecodeError, clean_url: String },
    /// The token decoded; confirm before applying
    Pending(ShareIntent),
}

/// Build a share link for `items` on top of `base`
///
/// Any existing `data` parameter on `base` is replaced; other parameters and
/// the fragment are kept.
pub fn share_url(base: &str, items: &[Item]) -> Result<String, ShareError> {
    let mut url = parse(base)?;
    let token = codec::encode(items);
    let kept = other_pairs(&url);

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        for (key, value) in &kept {
            query.append_pair(key, value);
        }
        query.append_pair(SHARE_PARAM, &token);
    }

    Ok(url.to_string())
}

/// Inspect a URL for a share token
pub fn ingest(link: &str) -> Result<ShareOutcome, ShareError> {
    let url = parse(link)?;

    let token = url
        .query_pairs()
        .find(|(key, _)| key == SHARE_PARAM)
        .map(|(_, value)| value.into_owned());
    let Some(token) = token else {
        return Ok(ShareOutcome::NoShare);
    };

    let clean_url = strip_share_param(&url);
    match codec::decode(&token) {
        Ok(items) => {
            tracing::info!("Share link carries {} item(s)", items.len());
            Ok(ShareOutcome::Pending(ShareIntent { items, clean_url }))
        }
        Err(error) => {
            tracing::warn!("Ignoring unusable share link: {}", error);
            Ok(ShareOutcome::Unusable { error, clean_url })
        }
    }
}

fn parse(link: &str) -> Result<Url, ShareError> {
    Url::parse(link.trim()).map_err(|source| ShareError::InvalidUrl {
        url: link.to_string(),
        source,
    })
}

fn other_pairs(url: &Url) -> Vec<(String, String)> {
    url.query_pairs()
        .filter(|(key, _)| key != SHARE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

fn strip_share_param(url: &Url) -> String {
    let kept = other_pairs(url);
    let mut clean = url.clone();
    if kept.is_empty() {
        clean.set_query(None);
    } else {
        clean.query_pairs_mut().clear().extend_pairs(kept);
    }
    clean.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, title: &str) -> Item {
        Item {
            id: id.to_string(),
            title: title.to_string(),
            content: "Hold 30 seconds".to_string(),
            caution: String::new(),
            link: String::new(),
            tags: vec!["ストレッチ".to_string()],
            created_at: 100,
            updated_at: 200,
        }
    }

    #[test]
    fn test_share_roundtrip() {
        let items = vec![item("a", "Hip Flexor"), item("b", "Child's Pose")];
        let link = share_url("https://guides.example/app", &items).unwrap();
        assert!(link.contains("?data="));

        match ingest(&link).unwrap() {
            ShareOutcome::Pending(intent) => {
                assert_eq!(intent.items, items);
                assert_eq!(intent.clean_url, "https://guides.example/app");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_share_url_replaces_existing_token_and_keeps_other_params() {
        let items = vec![item("a", "Squat")];
        let link = share_url("https://guides.example/?lang=en&data=old#top", &items).unwrap();

        assert_eq!(link.matches("data=").count(), 1);
        assert!(link.contains("lang=en"));
        assert!(link.ends_with("#top"));

        match ingest(&link).unwrap() {
            ShareOutcome::Pending(intent) => {
                assert_eq!(intent.clean_url, "https://guides.example/?lang=en#top");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_no_share_param() {
        let outcome = ingest("https://guides.example/?lang=en").unwrap();
        assert!(matches!(outcome, ShareOutcome::NoShare));
    }

    #[test]
    fn test_unusable_token() {
        let outcome = ingest("formguide://share?data=%%%not-a-token").unwrap();
        match outcome {
            ShareOutcome::Unusable { clean_url, .. } => {
                assert!(!clean_url.contains("data="));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_custom_scheme_base() {
        let items = vec![item("a", "Cat Cow")];
        let link = share_url("formguide://share", &items).unwrap();
        assert!(link.starts_with("formguide://share?data="));
        assert!(matches!(ingest(&link).unwrap(), ShareOutcome::Pending(_)));
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            ingest("not a url").unwrap_err(),
            ShareError::InvalidUrl { .. }
        ));
    }
}
