//! Member page payloads and continuation cursors.
//!
//! The members endpoint answers with
//!
//! ```json
//! {
//!   "resources": [
//!     {"id": "ire106sQKoHoXXsAe0g4", "_links": {"self": {"href": "https://org.example.com/api/v1/groups/00g1"}}}
//!   ],
//!   "_links": {
//!     "next": {"href": "https://org.example.com/api/v1/iam/resource-sets/iam1/resources?after=ire106sQKoHoXXsAe0g4"}
//!   }
//! }
//! ```
//!
//! The member URL is the `self` link of each entry. The continuation cursor
//! is the `after` query parameter of the `next` link; no `next` link means
//! the listing is complete.

use crate::error::ValidationError;
use crate::resource_set::ResourceUrl;
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

/// Query parameter carrying the continuation cursor.
pub const CURSOR_PARAM: &str = "after";

/// Query parameter carrying the requested page size.
pub const LIMIT_PARAM: &str = "limit";

/// Errors raised while interpreting a member page.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("page payload does not match the expected shape: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("member at index {index} has no self link")]
    MissingSelfLink { index: usize },

    #[error("member at index {index} is not a valid resource URL: {source}")]
    InvalidMember {
        index: usize,
        #[source]
        source: ValidationError,
    },

    #[error("next link '{href}' is not a valid URL: {reason}")]
    InvalidNextLink { href: String, reason: String },

    #[error("next link '{href}' carries no 'after' cursor")]
    MissingCursor { href: String },

    #[error("cursor '{cursor}' did not advance")]
    StalledCursor { cursor: String },
}

#[derive(Debug, Deserialize)]
struct RawPage {
    resources: Vec<RawMember>,
    #[serde(rename = "_links", default)]
    links: Option<RawPageLinks>,
}

#[derive(Debug, Deserialize)]
struct RawMember {
    #[serde(rename = "_links", default)]
    links: Option<RawMemberLinks>,
}

#[derive(Debug, Deserialize)]
struct RawMemberLinks {
    #[serde(rename = "self", default)]
    self_link: Option<Link>,
}

#[derive(Debug, Deserialize)]
struct RawPageLinks {
    #[serde(default)]
    next: Option<Link>,
}

#[derive(Debug, Deserialize)]
struct Link {
    href: String,
}

/// One parsed page of resource set members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPage {
    pub members: Vec<ResourceUrl>,
    /// Cursor for the following page, `None` on the last page
    pub next_cursor: Option<String>,
}

impl MemberPage {
    /// Parse a raw page payload.
    ///
    /// Fails if the payload is not shaped like a member page, if any member
    /// lacks a valid self link, or if the next link carries no cursor.
    pub fn parse(payload: Value) -> Result<Self, PageError> {
        let raw: RawPage = serde_json::from_value(payload)?;

        let members = raw
            .resources
            .into_iter()
            .enumerate()
            .map(|(index, member)| {
                let href = member
                    .links
                    .and_then(|links| links.self_link)
                    .map(|link| link.href)
                    .ok_or(PageError::MissingSelfLink { index })?;
                ResourceUrl::new(href).map_err(|source| PageError::InvalidMember { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let next_cursor = raw
            .links
            .and_then(|links| links.next)
            .map(|link| cursor_from_href(&link.href))
            .transpose()?;

        Ok(Self {
            members,
            next_cursor,
        })
    }

    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }
}

/// Extract the continuation cursor from a `next` link.
pub fn cursor_from_href(href: &str) -> Result<String, PageError> {
    let url = Url::parse(href).map_err(|e| PageError::InvalidNextLink {
        href: href.to_string(),
        reason: e.to_string(),
    })?;

    url.query_pairs()
        .find(|(name, _)| name == CURSOR_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|cursor| !cursor.is_empty())
        .ok_or_else(|| PageError::MissingCursor {
            href: href.to_string(),
        })
}

/// Build the `next` link for a members listing.
pub fn next_href(
    members_endpoint: &str,
    cursor: &str,
    limit: usize,
) -> Result<String, url::ParseError> {
    let mut url = Url::parse(members_endpoint)?;
    url.query_pairs_mut()
        .append_pair(CURSOR_PARAM, cursor)
        .append_pair(LIMIT_PARAM, &limit.to_string());
    Ok(url.to_string())
}

/// Render a member page payload in the remote system's shape.
pub fn render_page<S: AsRef<str>>(
    members_endpoint: &str,
    members: &[S],
    next: Option<&str>,
) -> Value {
    let resources: Vec<Value> = members
        .iter()
        .map(|url| json!({"_links": {"self": {"href": url.as_ref()}}}))
        .collect();

    let mut links = json!({"self": {"href": members_endpoint}});
    if let (Some(href), Some(obj)) = (next, links.as_object_mut()) {
        obj.insert("next".to_string(), json!({"href": href}));
    }

    json!({
        "resources": resources,
        "_links": links,
    })
}
