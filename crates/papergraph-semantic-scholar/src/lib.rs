//! papergraph-semantic-scholar: references and citations from the
//! Semantic Scholar graph API
//!
//! Only related papers that carry an arXiv id are returned; the rest of the
//! pipeline keys papers by arXiv id.

pub mod api;
pub mod schema;

pub use api::{DEFAULT_API_URL, Direction, S2Client, parse_related};
pub use schema::{FieldOfStudy, RelatedPaper, S2Author};
