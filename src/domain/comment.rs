use anyhow::Result;
use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::OffsetDateTime;
use uuid::Uuid;

pub const DEFAULT_AUTHOR: &str = "Admin";
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/150";

/// UTC timestamp with a fixed number of fractional digits, so that string
/// order and chronological order agree.
const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub text: String,
    pub date: String,
    pub likes: i64,
    pub image: String,
}

impl Comment {
    /// Builds a server-authored comment. Only `text` comes from the caller.
    pub fn new(text: String) -> Result<Self> {
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            text,
            date: format_date(OffsetDateTime::now_utc())?,
            likes: 0,
            image: PLACEHOLDER_IMAGE.to_string(),
        })
    }
}

pub fn format_date(at: OffsetDateTime) -> Result<String> {
    let at = at.to_offset(time::UtcOffset::UTC);
    Ok(at.format(DATE_FORMAT)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    DateUp,
    DateDown,
    IdUp,
    IdDown,
    Unsorted,
}

impl SortMode {
    /// Unknown tokens fall through to `Unsorted` instead of failing.
    pub fn from_token(token: &str) -> Self {
        match token {
            "date-up" => Self::DateUp,
            "date-down" => Self::DateDown,
            "id-up" => Self::IdUp,
            "id-down" => Self::IdDown,
            _ => Self::Unsorted,
        }
    }

    pub fn order_clause(&self) -> &'static str {
        match self {
            Self::DateUp => "ORDER BY date ASC, rowid ASC",
            Self::DateDown => "ORDER BY date DESC, rowid ASC",
            Self::IdUp => "ORDER BY id ASC",
            Self::IdDown => "ORDER BY id DESC",
            Self::Unsorted => "ORDER BY rowid ASC",
        }
    }
}

/// Shape of the optional seed file read on first start.
#[derive(Debug, Default, Deserialize)]
pub struct CommentFixture {
    #[serde(default)]
    pub comments: Vec<Comment>,
}
