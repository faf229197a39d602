use common::{BookId, Money};
use serde::{Deserialize, Serialize};

/// A catalog entry as served by `GET /api/books`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub price: Money,
    pub image_url: String,
    /// Numeric category code, e.g. `"4"`.
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

impl Book {
    /// Human-readable name of the book's category, if the code is known.
    pub fn category_name(&self) -> Option<&'static str> {
        category_name(&self.category)
    }
}

/// Maps a category code to its display name.
pub fn category_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "1" => "Classic Literature",
        "2" => "Fantasy & Adventure",
        "3" => "Children & Young Adult",
        "4" => "Technology & Business",
        "5" => "Personal Development",
        "6" => "History",
        "7" => "Marketing & Entrepreneurship",
        "8" => "Science Fiction",
        "9" => "Spirituality",
        "10" => "Mystery & Thriller",
        _ => return None,
    };
    Some(name)
}
