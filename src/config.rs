use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory holding the catalog datasets and the vote ledger
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory served as the landing page and its assets
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of genres kept from a similarity query
    #[serde(default = "default_top_k")]
    pub recommend_top_k: usize,

    /// Similarity a genre must exceed to be recommended
    #[serde(default = "default_min_score")]
    pub recommend_min_score: f64,
}

pub const GENRES_FILE: &str = "genres.json";
pub const PERSONALITY_TYPES_FILE: &str = "mbti_types.json";
pub const BOOKS_FILE: &str = "books.json";
pub const BOOK_GENRES_FILE: &str = "book_genres.json";
pub const VOTES_FILE: &str = "votes.json";

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_top_k() -> usize {
    3
}

fn default_min_score() -> f64 {
    0.05
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            static_dir: default_static_dir(),
            host: default_host(),
            port: default_port(),
            recommend_top_k: default_top_k(),
            recommend_min_score: default_min_score(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Path of a dataset file inside the data directory
    pub fn data_file(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    pub fn index_page(&self) -> PathBuf {
        Path::new(&self.static_dir).join("index.html")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
