use serde::Serialize;

use crate::identifier::SEPARATOR;

/// Row limit for searches scoped to a room or room number.
pub const SCOPED_LIMIT: u32 = 1000;

/// Row limit for building-wide and unfiltered searches. Results at this
/// limit may be truncated.
pub const BROAD_LIMIT: u32 = 30;

/// Lower bound that matches every document ID.
pub const ALL_IDS: &str = "\u{0}";

/// One Mango condition on a single field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Condition {
    #[serde(rename = "$gt", skip_serializing_if = "Option::is_none")]
    pub gt: Option<String>,
    #[serde(rename = "$lt", skip_serializing_if = "Option::is_none")]
    pub lt: Option<String>,
    #[serde(rename = "$regex", skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

impl Condition {
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            regex: Some(pattern.into()),
            ..Default::default()
        }
    }

    pub fn greater_than(bound: impl Into<String>) -> Self {
        Self {
            gt: Some(bound.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selector {
    #[serde(rename = "_id")]
    pub id: Condition,
    #[serde(rename = "typeID", skip_serializing_if = "Option::is_none")]
    pub type_id: Option<Condition>,
}

/// Body of a `_find` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    pub selector: Selector,
    pub limit: u32,
}

impl SearchQuery {
    pub fn new(id: Condition, limit: u32) -> Self {
        Self {
            selector: Selector { id, type_id: None },
            limit,
        }
    }

    pub fn with_type(mut self, type_id: Condition) -> Self {
        self.selector.type_id = Some(type_id);
        self
    }

    /// True when the limit may have cut the listing short.
    pub fn is_truncating(&self) -> bool {
        self.limit == BROAD_LIMIT
    }
}

/// Search over collections keyed by device IDs (`BLDG-ROOM-suffix`).
///
/// Precedence: room + building, room only, building only, neither. The
/// device-type filter applies on top of whichever branch fired.
pub fn build_search_query(
    room_num: Option<&str>,
    bldg_abbr: Option<&str>,
    device_type: Option<&str>,
) -> SearchQuery {
    let query = match (non_empty(room_num), non_empty(bldg_abbr)) {
        (Some(room), Some(bldg)) => SearchQuery::new(
            Condition::regex(format!("^{}{SEPARATOR}{}{SEPARATOR}", escape(bldg), escape(room))),
            SCOPED_LIMIT,
        ),
        (Some(room), None) => SearchQuery::new(
            Condition::regex(format!("{SEPARATOR}{}{SEPARATOR}", escape(room))),
            SCOPED_LIMIT,
        ),
        (None, Some(bldg)) => SearchQuery::new(
            Condition::regex(format!("^{}{SEPARATOR}", escape(bldg))),
            BROAD_LIMIT,
        ),
        (None, None) => SearchQuery::new(Condition::greater_than(ALL_IDS), BROAD_LIMIT),
    };

    match non_empty(device_type) {
        Some(device_type) => query.with_type(Condition::regex(escape(device_type))),
        None => query,
    }
}

/// Search over collections keyed by room IDs (`BLDG-ROOM`), such as rooms
/// and UI configurations. Same precedence and limits as
/// [`build_search_query`].
pub fn build_room_search_query(room_num: Option<&str>, bldg_abbr: Option<&str>) -> SearchQuery {
    match (non_empty(room_num), non_empty(bldg_abbr)) {
        (Some(room), Some(bldg)) => SearchQuery::new(
            Condition::regex(format!("^{}{SEPARATOR}{}$", escape(bldg), escape(room))),
            SCOPED_LIMIT,
        ),
        (Some(room), None) => SearchQuery::new(
            Condition::regex(format!("{SEPARATOR}{}$", escape(room))),
            SCOPED_LIMIT,
        ),
        (None, Some(bldg)) => SearchQuery::new(
            Condition::regex(format!("^{}{SEPARATOR}", escape(bldg))),
            BROAD_LIMIT,
        ),
        (None, None) => SearchQuery::new(Condition::greater_than(ALL_IDS), BROAD_LIMIT),
    }
}

/// Every device document inside one room.
pub fn devices_in_room_query(room_id: &str) -> SearchQuery {
    SearchQuery::new(
        Condition::regex(format!("^{}{SEPARATOR}", escape(room_id))),
        SCOPED_LIMIT,
    )
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Escape regex metacharacters so user input only matches literally.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if "\\^$.|?*+()[]{}".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
