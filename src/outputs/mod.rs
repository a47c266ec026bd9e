//! Persistence of the aggregate news document.
//!
//! ```text
//! news_data.json
//! {
//!   "updated_at": "2025-05-06 10:30",
//!   "categories": [{ "name": "...", "articles": [{ "title", "link", "source", "date" }] }],
//!   "summary": "..."
//! }
//! ```

pub mod json;
