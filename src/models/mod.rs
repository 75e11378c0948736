use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub type GenreId = i64;
pub type BookId = i64;

/// Identifier of a personality type.
///
/// Datasets exported from the catalog database carry either numeric or textual
/// type ids. Matching is exact on both kind and value, so `1` and `"1"` are
/// different types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeId {
    Number(i64),
    Text(String),
}

impl Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeId::Number(id) => write!(f, "{}", id),
            TypeId::Text(id) => write!(f, "{}", id),
        }
    }
}

/// A book genre with the description the similarity engine is fitted on
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Genre {
    #[serde(rename = "GenreID")]
    pub genre_id: GenreId,
    #[serde(rename = "GenreName", default)]
    pub genre_name: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
}

impl Genre {
    /// Description text, empty when the dataset has none
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// A personality type (e.g. an MBTI code) and its descriptive text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonalityType {
    #[serde(rename = "TypeID")]
    pub type_id: TypeId,
    #[serde(rename = "TypeName", default)]
    pub type_name: Option<String>,
    #[serde(rename = "TypeDescription", default)]
    pub type_description: Option<String>,
}

/// A catalog book.
///
/// Attributes outside the known set are kept in `extra` so recommendation
/// output echoes the record exactly as it was loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    #[serde(rename = "BookID")]
    pub book_id: BookId,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Author", default)]
    pub author: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "CoverImagePath", default)]
    pub cover_image_path: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Book {
    /// Key of this book in the vote ledger
    pub fn ledger_key(&self) -> String {
        self.book_id.to_string()
    }
}

/// Many-to-many association between books and genres
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BookGenreLink {
    #[serde(rename = "BookID")]
    pub book_id: BookId,
    #[serde(rename = "GenreID")]
    pub genre_id: GenreId,
}

/// A book returned by the recommendation endpoint, enriched with its vote count
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendedBook {
    #[serde(flatten)]
    pub book: Book,
    #[serde(rename = "TotalVotes")]
    pub total_votes: u64,
}

/// A genre ranked by similarity to a query text
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct GenreMatch {
    pub genre_id: GenreId,
    pub score: f64,
}
