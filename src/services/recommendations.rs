use std::collections::HashSet;

use crate::{
    config::{self, Config},
    models::{Book, BookGenreLink, BookId, Genre, GenreId, PersonalityType, RecommendedBook, TypeId},
    services::{similarity::SimilarityEngine, votes::VoteLedger},
    store::load_collection,
};

/// Read-only catalog datasets, loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub genres: Vec<Genre>,
    pub personality_types: Vec<PersonalityType>,
    pub books: Vec<Book>,
    pub book_genres: Vec<BookGenreLink>,
}

impl Catalog {
    /// Loads every dataset from the configured data directory.
    ///
    /// Missing or malformed files become empty collections.
    pub async fn load(config: &Config) -> Self {
        let catalog = Self {
            genres: load_collection(&config.data_file(config::GENRES_FILE)).await,
            personality_types: load_collection(&config.data_file(config::PERSONALITY_TYPES_FILE))
                .await,
            books: load_collection(&config.data_file(config::BOOKS_FILE)).await,
            book_genres: load_collection(&config.data_file(config::BOOK_GENRES_FILE)).await,
        };

        tracing::info!(
            genres = catalog.genres.len(),
            personality_types = catalog.personality_types.len(),
            books = catalog.books.len(),
            book_genres = catalog.book_genres.len(),
            "Catalog loaded"
        );

        catalog
    }

    /// Exact-match lookup of a personality type
    pub fn find_type(&self, type_id: &TypeId) -> Option<&PersonalityType> {
        self.personality_types.iter().find(|t| &t.type_id == type_id)
    }

    /// Ids of books linked to any of `genre_ids`
    pub fn books_in_genres(&self, genre_ids: &[GenreId]) -> HashSet<BookId> {
        self.book_genres
            .iter()
            .filter(|link| genre_ids.contains(&link.genre_id))
            .map(|link| link.book_id)
            .collect()
    }
}

/// Turns a personality type into book recommendations
pub struct Recommender {
    catalog: Catalog,
    engine: Option<SimilarityEngine>,
    top_k: usize,
    min_score: f64,
}

impl Recommender {
    /// Fits the similarity engine on the catalog's genres
    pub fn new(catalog: Catalog, top_k: usize, min_score: f64) -> Self {
        let engine = SimilarityEngine::fit(&catalog.genres);
        if engine.is_none() {
            tracing::warn!("No genres loaded, recommendations will be empty");
        }

        Self {
            catalog,
            engine,
            top_k,
            min_score,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Genre ids recommended for a personality type.
    ///
    /// An unknown type, a type without description, or a missing engine all
    /// yield an empty list.
    pub fn recommended_genres(&self, type_id: &TypeId) -> Vec<GenreId> {
        let Some(personality) = self.catalog.find_type(type_id) else {
            tracing::debug!(type_id = %type_id, "Unknown personality type");
            return Vec::new();
        };
        let Some(engine) = &self.engine else {
            return Vec::new();
        };

        let description = personality.type_description.as_deref().unwrap_or("");
        let matches = engine.nearest_genres(description, self.top_k, self.min_score);
        tracing::debug!(type_id = %type_id, ?matches, "Genres matched");

        matches.into_iter().map(|m| m.genre_id).collect()
    }

    /// Books for a personality type, in catalog order, each with its vote count.
    ///
    /// A book linked to several recommended genres appears once.
    pub async fn recommend(&self, type_id: &TypeId, ledger: &VoteLedger) -> Vec<RecommendedBook> {
        let genre_ids = self.recommended_genres(type_id);
        if genre_ids.is_empty() {
            return Vec::new();
        }

        let book_ids = self.catalog.books_in_genres(&genre_ids);
        let votes = ledger.snapshot().await;

        let books: Vec<RecommendedBook> = self
            .catalog
            .books
            .iter()
            .filter(|book| book_ids.contains(&book.book_id))
            .map(|book| RecommendedBook {
                book: book.clone(),
                total_votes: votes.get(&book.ledger_key()).copied().unwrap_or(0),
            })
            .collect();

        tracing::info!(
            type_id = %type_id,
            genres = genre_ids.len(),
            books = books.len(),
            "Recommendations resolved"
        );

        books
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LedgerStore, MockLedgerStore, VoteCounts};
    use std::sync::Arc;

    fn genre(id: GenreId, description: &str) -> Genre {
        Genre {
            genre_id: id,
            genre_name: None,
            description: Some(description.to_string()),
        }
    }

    fn book(id: BookId, title: &str) -> Book {
        Book {
            book_id: id,
            title: Some(title.to_string()),
            author: None,
            description: None,
            cover_image_path: None,
            extra: Default::default(),
        }
    }

    fn link(book_id: BookId, genre_id: GenreId) -> BookGenreLink {
        BookGenreLink { book_id, genre_id }
    }

    fn personality(id: TypeId, description: &str) -> PersonalityType {
        PersonalityType {
            type_id: id,
            type_name: None,
            type_description: Some(description.to_string()),
        }
    }

    fn test_catalog() -> Catalog {
        Catalog {
            genres: vec![
                genre(1, "dark gritty mystery detective crime"),
                genre(2, "light cheerful romance love"),
                genre(3, "detective crime thriller suspense"),
            ],
            personality_types: vec![
                personality(TypeId::Text("INTJ".into()), "strategic detective who loves crime puzzles"),
                personality(TypeId::Number(2), "warm romantic who believes in love"),
                personality(TypeId::Text("ESTP".into()), "bold gardener"),
            ],
            books: vec![
                book(10, "Gone Girl"),
                book(11, "Pride and Prejudice"),
                book(12, "The Big Sleep"),
                book(13, "In Cold Blood"),
            ],
            book_genres: vec![
                link(13, 1),
                link(12, 1),
                link(12, 3),
                link(11, 2),
                link(10, 3),
            ],
        }
    }

    async fn ledger_with(counts: &[(&str, u64)]) -> VoteLedger {
        let seeded: VoteCounts = counts.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        let mut store = MockLedgerStore::new();
        store.expect_load().return_once(move || seeded);
        store.expect_persist().returning(|_| Ok(()));
        let store: Arc<dyn LedgerStore> = Arc::new(store);
        VoteLedger::open(store).await
    }

    #[tokio::test]
    async fn test_unknown_type_is_empty() {
        let recommender = Recommender::new(test_catalog(), 3, 0.05);
        let ledger = ledger_with(&[]).await;
        let books = recommender
            .recommend(&TypeId::Text("XXXX".into()), &ledger)
            .await;
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn test_type_id_kind_must_match() {
        let recommender = Recommender::new(test_catalog(), 3, 0.05);
        assert!(recommender.recommended_genres(&TypeId::Text("2".into())).is_empty());
        assert_eq!(recommender.recommended_genres(&TypeId::Number(2)), vec![2]);
    }

    #[tokio::test]
    async fn test_union_without_duplicates_in_catalog_order() {
        let recommender = Recommender::new(test_catalog(), 3, 0.05);
        let ledger = ledger_with(&[("12", 4)]).await;

        let genres = recommender.recommended_genres(&TypeId::Text("INTJ".into()));
        assert!(genres.contains(&1));
        assert!(genres.contains(&3));
        assert!(!genres.contains(&2));

        let books = recommender
            .recommend(&TypeId::Text("INTJ".into()), &ledger)
            .await;
        let ids: Vec<BookId> = books.iter().map(|b| b.book.book_id).collect();
        assert_eq!(ids, vec![10, 12, 13]);

        let votes: Vec<u64> = books.iter().map(|b| b.total_votes).collect();
        assert_eq!(votes, vec![0, 4, 0]);
    }

    #[tokio::test]
    async fn test_no_matching_genre_is_empty() {
        let recommender = Recommender::new(test_catalog(), 3, 0.05);
        let ledger = ledger_with(&[]).await;
        let books = recommender
            .recommend(&TypeId::Text("ESTP".into()), &ledger)
            .await;
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn test_empty_genres_degrade_to_empty() {
        let catalog = Catalog {
            genres: Vec::new(),
            ..test_catalog()
        };
        let recommender = Recommender::new(catalog, 3, 0.05);
        let ledger = ledger_with(&[]).await;
        let books = recommender
            .recommend(&TypeId::Text("INTJ".into()), &ledger)
            .await;
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn test_top_k_limits_genres() {
        let recommender = Recommender::new(test_catalog(), 1, 0.05);
        let genres = recommender.recommended_genres(&TypeId::Text("INTJ".into()));
        assert_eq!(genres.len(), 1);
    }

    #[test]
    fn test_books_in_genres_is_a_set() {
        let catalog = test_catalog();
        let ids = catalog.books_in_genres(&[1, 3]);
        assert_eq!(ids, HashSet::from([10, 12, 13]));
    }

    #[tokio::test]
    async fn test_load_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().join("absent"),
            ..Config::default()
        };
        let catalog = Catalog::load(&config).await;
        assert!(catalog.genres.is_empty());
        assert!(catalog.books.is_empty());
    }
}
