use serde::Deserialize;

/// Opaque upstream identifier for any item.
///
/// The unit of caching, of ordering in the upstream id lists, and of
/// tree-node identity.
pub type ItemId = u64;

/// Base of the public HN item pages, used when an item carries no URL of
/// its own (Ask HN, polls, comments).
pub const HN_ITEM_BASE: &str = "https://news.ycombinator.com/item?id=";

// ============================================================================
// Feed Types
// ============================================================================

/// Selects which upstream id list is consulted and which kind filter applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedType {
    Stories,
    Jobs,
    Polls,
}

impl FeedType {
    /// Upstream list endpoint name.
    ///
    /// There is no dedicated poll list; polls are mined out of the story
    /// stream by the cursor's scanning advance.
    pub fn endpoint(self) -> &'static str {
        match self {
            FeedType::Jobs => "jobstories",
            FeedType::Stories | FeedType::Polls => "newstories",
        }
    }

    /// The item kind that survives this feed's filter.
    pub fn kind_filter(self) -> ItemKind {
        match self {
            FeedType::Stories => ItemKind::Story,
            FeedType::Jobs => ItemKind::Job,
            FeedType::Polls => ItemKind::Poll,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FeedType::Stories => "stories",
            FeedType::Jobs => "jobs",
            FeedType::Polls => "polls",
        }
    }

    /// Parse a user-supplied feed name (CLI `--feed` flag).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "stories" => Some(FeedType::Stories),
            "jobs" => Some(FeedType::Jobs),
            "polls" => Some(FeedType::Polls),
            _ => None,
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            FeedType::Stories => FeedType::Jobs,
            FeedType::Jobs => FeedType::Polls,
            FeedType::Polls => FeedType::Stories,
        }
    }
}

impl std::fmt::Display for FeedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Items
// ============================================================================

/// Wire-level item kind as served in the JSON `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Story,
    Job,
    Poll,
    Comment,
    PollOpt,
}

/// One Hacker News item as served by the Firebase v0 API.
///
/// Nearly every field is optional on the wire: deleted items keep only
/// their id and a `deleted` flag, comments have no title, stories have no
/// `text`, and only polls carry `parts`.
#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Absent for deleted/missing items.
    #[serde(rename = "type")]
    pub kind: Option<ItemKind>,
    pub by: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    /// Creation time, unix seconds.
    #[serde(default)]
    pub time: i64,
    /// Child comment ids, absent for leaves.
    pub kids: Option<Vec<ItemId>>,
    /// Poll option ids, polls only.
    pub parts: Option<Vec<ItemId>>,
    /// Total comment count, stories and polls only.
    pub descendants: Option<u32>,
    /// Body HTML fragment, comments and poll options.
    pub text: Option<String>,
    pub score: Option<i64>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub dead: bool,
}

impl Item {
    /// Whether this item should vanish from comment trees.
    pub fn is_tombstone(&self) -> bool {
        self.deleted || self.dead
    }

    /// The link a rendered post points at: the story URL when present,
    /// otherwise the HN discussion page.
    pub fn link(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!("{HN_ITEM_BASE}{}", self.id),
        }
    }
}

// ============================================================================
// Search
// ============================================================================

/// A single hit from the Algolia search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    /// Algolia serves item ids as strings.
    #[serde(rename = "objectID")]
    pub id: String,
    pub title: Option<String>,
    pub url: Option<String>,
    /// Creation time, unix seconds.
    #[serde(rename = "created_at_i", default)]
    pub created_at: i64,
}

impl SearchHit {
    pub fn link(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!("{HN_ITEM_BASE}{}", self.id),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_deserializes() {
        let json = r#"{
            "id": 8863,
            "type": "story",
            "by": "dhouston",
            "time": 1175714200,
            "title": "My YC app: Dropbox",
            "url": "http://www.getdropbox.com/u/2/screencast.html",
            "score": 111,
            "descendants": 71,
            "kids": [8952, 9224]
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, 8863);
        assert_eq!(item.kind, Some(ItemKind::Story));
        assert_eq!(item.kids.as_deref(), Some(&[8952, 9224][..]));
        assert!(!item.deleted);
    }

    #[test]
    fn test_deleted_item_has_no_kind() {
        let json = r#"{"id": 1, "deleted": true, "time": 0}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.kind, None);
        assert!(item.is_tombstone());
    }

    #[test]
    fn test_pollopt_kind_name() {
        let json = r#"{"id": 160705, "type": "pollopt", "text": "Yes", "score": 335, "time": 1207886576}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.kind, Some(ItemKind::PollOpt));
    }

    #[test]
    fn test_link_falls_back_to_item_page() {
        let json = r#"{"id": 42, "type": "story", "title": "Ask HN: test", "time": 1}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.link(), "https://news.ycombinator.com/item?id=42");
    }

    #[test]
    fn test_feed_endpoints() {
        assert_eq!(FeedType::Stories.endpoint(), "newstories");
        assert_eq!(FeedType::Jobs.endpoint(), "jobstories");
        // No poll endpoint upstream; polls scan the story stream.
        assert_eq!(FeedType::Polls.endpoint(), "newstories");
    }

    #[test]
    fn test_search_hit_created_at_field() {
        let json = r#"{"objectID": "121003", "title": "Ask HN", "created_at_i": 1203647620}"#;
        let hit: SearchHit = serde_json::from_str(json).unwrap();
        assert_eq!(hit.created_at, 1203647620);
        assert_eq!(hit.link(), "https://news.ycombinator.com/item?id=121003");
    }
}
