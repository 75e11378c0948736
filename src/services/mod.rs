pub mod recommendations;
pub mod similarity;
pub mod stop_words;
pub mod votes;

pub use recommendations::{Catalog, Recommender};
pub use similarity::SimilarityEngine;
pub use votes::{VoteLedger, VoteReceipt};
