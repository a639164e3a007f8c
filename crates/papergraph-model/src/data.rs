//! Graph records exchanged between exporter and loader.
//!
//! Field names are camelCase on the wire; absent optionals are omitted.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of graph vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Author,
    Paper,
    Venue,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Author => "author",
            Self::Paper => "paper",
            Self::Venue => "venue",
        })
    }
}

/// Graph vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Layout sizing hint; only paper nodes carry it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_count: Option<i64>,
}

impl Node {
    pub fn paper(id: &str, label: Option<String>, citation_count: i64) -> Self {
        Self {
            id: id.to_string(),
            node_type: NodeType::Paper,
            label,
            citation_count: Some(citation_count),
        }
    }

    pub fn author(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            node_type: NodeType::Author,
            label: Some(name.to_string()),
            citation_count: None,
        }
    }

    pub fn venue(id: &str, label: &str) -> Self {
        Self {
            id: id.to_string(),
            node_type: NodeType::Venue,
            label: Some(label.to_string()),
            citation_count: None,
        }
    }

    /// Citation count for layout, 0 when absent
    pub fn weight(&self) -> i64 {
        self.citation_count.unwrap_or(0)
    }
}

/// Kind of graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    /// author → paper
    Published,
    /// citing paper → cited paper
    Cited,
    /// paper → venue
    AppearedIn,
}

/// Directed graph edge. Duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub link_type: LinkType,
}

impl Link {
    pub fn new(source: &str, target: &str, link_type: LinkType) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            link_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorData {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperData {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arxiv_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#abstract: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueData {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<String>,
}

/// Sizes of the deduplicated entity maps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub author_count: usize,
    pub paper_count: usize,
    pub venue_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkData {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

/// The merged dataset a loader hands to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportedData {
    pub statistics: Statistics,
    pub network: NetworkData,
    pub authors: Vec<AuthorData>,
    pub papers: Vec<PaperData>,
    pub venues: Vec<VenueData>,
}
