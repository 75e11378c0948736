use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use regex::Regex;

use super::stop_words::is_stop_word;
use crate::models::{Genre, GenreId, GenreMatch};

/// Sparse row: (vocabulary index, weight), sorted by index
type SparseVector = Vec<(usize, f64)>;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Runs of at least two letters, digits or underscores. Combining marks and
    // the zero-width non-joiner split words rather than joining them.
    PATTERN.get_or_init(|| Regex::new(r"[\p{L}\p{N}_]{2,}").expect("token pattern is valid"))
}

/// Lowercases `text` and splits it into vocabulary candidates, dropping stop words
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    token_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| !is_stop_word(token))
        .map(str::to_string)
        .collect()
}

/// TF-IDF vector space fitted on genre descriptions.
///
/// Row `i` always describes the `i`-th genre the engine was fitted on. The
/// fitted state is immutable, so a shared engine needs no locking.
#[derive(Debug, Clone)]
pub struct SimilarityEngine {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    rows: Vec<SparseVector>,
    genre_ids: Vec<GenreId>,
}

impl SimilarityEngine {
    /// Fits the vector space on the genres' descriptions, in the given order.
    ///
    /// Returns `None` when there are no genres to fit on.
    pub fn fit(genres: &[Genre]) -> Option<Self> {
        if genres.is_empty() {
            return None;
        }

        let documents: Vec<Vec<String>> = genres
            .iter()
            .map(|genre| tokenize(genre.description_text()))
            .collect();

        let terms: BTreeSet<&str> = documents
            .iter()
            .flat_map(|doc| doc.iter().map(String::as_str))
            .collect();
        let vocabulary: HashMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term.to_string(), index))
            .collect();

        let mut doc_freq = vec![0usize; vocabulary.len()];
        for doc in &documents {
            let unique: BTreeSet<usize> = doc.iter().map(|term| vocabulary[term]).collect();
            for index in unique {
                doc_freq[index] += 1;
            }
        }

        // Smoothed idf: ln((1 + n) / (1 + df)) + 1
        let n_docs = documents.len() as f64;
        let idf: Vec<f64> = doc_freq
            .iter()
            .map(|&df| ((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        let mut engine = Self {
            vocabulary,
            idf,
            rows: Vec::with_capacity(documents.len()),
            genre_ids: genres.iter().map(|genre| genre.genre_id).collect(),
        };
        let rows: Vec<SparseVector> = documents.iter().map(|doc| engine.weigh(doc)).collect();
        engine.rows = rows;

        tracing::info!(
            genres = engine.rows.len(),
            vocabulary = engine.vocabulary.len(),
            "Similarity engine fitted"
        );

        Some(engine)
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn genre_count(&self) -> usize {
        self.rows.len()
    }

    /// Projects arbitrary text into the fitted space; unknown terms are ignored
    pub fn vectorize(&self, text: &str) -> SparseVector {
        self.weigh(&tokenize(text))
    }

    /// Term counts scaled by idf, L2-normalized
    fn weigh(&self, tokens: &[String]) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in tokens {
            if let Some(&index) = self.vocabulary.get(token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();
        vector.sort_by_key(|&(index, _)| index);

        let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, weight) in vector.iter_mut() {
                *weight /= norm;
            }
        }
        vector
    }

    /// Cosine similarity of `query` against every genre, in row order
    pub fn similarities(&self, query: &str) -> Vec<f64> {
        let query = self.vectorize(query);
        self.rows.iter().map(|row| dot(row, &query)).collect()
    }

    /// Genres most similar to `query`, best first.
    ///
    /// At most `k` genres are returned, and only those scoring strictly above
    /// `min_score`. Equal scores keep genre load order.
    pub fn nearest_genres(&self, query: &str, k: usize, min_score: f64) -> Vec<GenreMatch> {
        let mut ranked: Vec<GenreMatch> = self
            .similarities(query)
            .into_iter()
            .zip(&self.genre_ids)
            .map(|(score, &genre_id)| GenreMatch { genre_id, score })
            .collect();

        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        ranked
            .into_iter()
            .take(k)
            .filter(|m| m.score > min_score)
            .collect()
    }
}

fn dot(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
    let (mut i, mut j, mut sum) = (0, 0, 0.0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genre(id: GenreId, description: &str) -> Genre {
        Genre {
            genre_id: id,
            genre_name: None,
            description: Some(description.to_string()),
        }
    }

    #[test]
    fn test_tokenize_lowercases_and_drops_stop_words() {
        assert_eq!(
            tokenize("The DARK and Gritty mystery, of a city"),
            vec!["dark", "gritty", "mystery", "city"]
        );
    }

    #[test]
    fn test_tokenize_skips_single_characters() {
        assert_eq!(tokenize("x y zz"), vec!["zz"]);
    }

    #[test]
    fn test_tokenize_splits_on_zwnj_and_combining_marks() {
        assert_eq!(
            tokenize("می\u{200c}خواهم کتاب\u{064e} خوب"),
            vec!["می", "خواهم", "کتاب", "خوب"]
        );
    }

    #[test]
    fn test_persian_query_matches_despite_zwnj_and_diacritics() {
        let engine = SimilarityEngine::fit(&[genre(1, "کتاب خواهم"), genre(2, "شعر")]).unwrap();
        let matches = engine.nearest_genres("می\u{200c}خواهم کتاب\u{064e}", 3, 0.05);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].genre_id, 1);
        assert!(matches[0].score > 0.5);
    }

    #[test]
    fn test_empty_catalog_has_no_engine() {
        assert!(SimilarityEngine::fit(&[]).is_none());
    }

    #[test]
    fn test_dark_query_matches_mystery() {
        let engine = SimilarityEngine::fit(&[
            genre(1, "dark gritty mystery"),
            genre(2, "light cheerful romance"),
        ])
        .unwrap();

        let matches = engine.nearest_genres("enjoys solving dark puzzles", 3, 0.05);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].genre_id, 1);
        assert!(matches[0].score > 0.05);
        assert!((matches[0].score - 1.0 / 3f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let engine = SimilarityEngine::fit(&[
            genre(1, "epic fantasy quest dragons"),
            genre(2, "fantasy romance"),
        ])
        .unwrap();
        for row in &engine.rows {
            let norm: f64 = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
        let self_scores = engine.similarities("epic fantasy quest dragons");
        assert!((self_scores[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_shared_terms_weigh_less() {
        let engine = SimilarityEngine::fit(&[
            genre(1, "adventure dragons"),
            genre(2, "adventure pirates"),
            genre(3, "adventure spaceships"),
        ])
        .unwrap();
        let scores = engine.similarities("adventure dragons");
        assert!(scores[0] > scores[1]);
        assert!(scores[1] > 0.0);
        assert!((scores[1] - scores[2]).abs() < 1e-12);
    }

    #[test]
    fn test_single_genre_is_still_queryable() {
        let engine = SimilarityEngine::fit(&[genre(5, "philosophy ethics")]).unwrap();
        let matches = engine.nearest_genres("ethics", 3, 0.05);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].genre_id, 5);
    }

    #[test]
    fn test_at_most_k_sorted_descending() {
        let engine = SimilarityEngine::fit(&[
            genre(1, "history war"),
            genre(2, "history war politics"),
            genre(3, "history war politics economy"),
            genre(4, "history"),
            genre(5, "cooking"),
        ])
        .unwrap();
        let matches = engine.nearest_genres("history war", 3, 0.05);
        assert_eq!(matches.len(), 3);
        assert!(matches.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(matches.iter().all(|m| m.score > 0.05));
        assert!(matches.iter().all(|m| m.genre_id != 5));
        assert_eq!(matches[0].genre_id, 1);
    }

    #[test]
    fn test_ties_keep_load_order() {
        let engine = SimilarityEngine::fit(&[
            genre(30, "space opera"),
            genre(10, "space western"),
            genre(20, "space horror"),
        ])
        .unwrap();
        let matches = engine.nearest_genres("space", 3, 0.05);
        let ids: Vec<GenreId> = matches.iter().map(|m| m.genre_id).collect();
        assert_eq!(ids, vec![30, 10, 20]);
    }

    #[test]
    fn test_out_of_vocabulary_query_is_empty() {
        let engine = SimilarityEngine::fit(&[genre(1, "mystery"), genre(2, "romance")]).unwrap();
        assert!(engine.nearest_genres("quantum chromodynamics", 3, 0.05).is_empty());
        assert!(engine.nearest_genres("", 3, 0.05).is_empty());
    }

    #[test]
    fn test_floor_is_strict() {
        let engine = SimilarityEngine::fit(&[genre(1, "mystery"), genre(2, "romance")]).unwrap();
        let matches = engine.nearest_genres("mystery", 3, 1.0);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_missing_descriptions_fit_as_empty() {
        let engine = SimilarityEngine::fit(&[
            Genre {
                genre_id: 1,
                genre_name: Some("Untitled".into()),
                description: None,
            },
            genre(2, "satire"),
        ])
        .unwrap();
        assert_eq!(engine.genre_count(), 2);
        assert_eq!(engine.vocabulary_size(), 1);
        let matches = engine.nearest_genres("satire", 3, 0.05);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].genre_id, 2);
    }
}
