//! Book recommendations by personality type.
//!
//! Genre descriptions are fitted into a TF-IDF vector space at startup; a
//! personality type's description is matched against it and the closest
//! genres are resolved to books. Readers can also vote for books.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;
