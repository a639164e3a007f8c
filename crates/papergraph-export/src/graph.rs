//! Deduplication pass: papers → entity maps + node/link lists.
//!
//! Papers are visited once, in source order. Each visit produces a
//! [`PaperContribution`] computed against the maps built so far, which is
//! then merged into the owned accumulators.
//!
//! Nodes are deduplicated for authors and venues (first sight wins); links
//! never are. A paper at an already-seen venue adds no venue node but still
//! adds its own `appeared_in` link.

use papergraph_model::{
    AuthorData, Link, LinkType, Node, PaperData, Statistics, VenueData,
};
use rustc_hash::FxHashMap;

use crate::source::{AuthorRecord, PaperRecord, VenueRecord};

/// Label used for venue nodes without a name.
pub const UNKNOWN_VENUE: &str = "Unknown Venue";

/// Id-keyed map that remembers first insertion order.
#[derive(Debug)]
struct OrderedMap<T> {
    index: FxHashMap<String, usize>,
    values: Vec<T>,
}

impl<T> Default for OrderedMap<T> {
    fn default() -> Self {
        Self {
            index: FxHashMap::default(),
            values: Vec::new(),
        }
    }
}

impl<T> OrderedMap<T> {
    fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Insert or overwrite; an overwrite keeps the original position.
    fn upsert(&mut self, id: &str, value: T) {
        match self.index.get(id) {
            Some(&i) => self.values[i] = value,
            None => {
                self.index.insert(id.to_string(), self.values.len());
                self.values.push(value);
            }
        }
    }

    /// Insert only when absent. Returns whether it was inserted.
    fn insert_new(&mut self, id: &str, value: T) -> bool {
        if self.contains(id) {
            return false;
        }
        self.index.insert(id.to_string(), self.values.len());
        self.values.push(value);
        true
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn into_values(self) -> Vec<T> {
        self.values
    }
}

/// Everything one paper adds to the graph.
#[derive(Debug, Default)]
pub struct PaperContribution {
    pub paper: Option<PaperData>,
    /// Venue seen for the first time
    pub new_venue: Option<VenueData>,
    /// Authors seen for the first time, in author order
    pub new_authors: Vec<AuthorData>,
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

/// The deduplicated graph, ready to chunk.
#[derive(Debug, Clone, Default)]
pub struct ExportGraph {
    pub statistics: Statistics,
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub authors: Vec<AuthorData>,
    pub papers: Vec<PaperData>,
    pub venues: Vec<VenueData>,
}

/// Accumulates contributions paper by paper.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    authors: OrderedMap<AuthorData>,
    papers: OrderedMap<PaperData>,
    venues: OrderedMap<VenueData>,
    nodes: Vec<Node>,
    links: Vec<Link>,
}

fn paper_data(paper: &PaperRecord) -> PaperData {
    PaperData {
        id: paper.id.clone(),
        arxiv_id: paper.arxiv_id.clone(),
        title: paper.title.clone(),
        r#abstract: paper.abstract_text.clone(),
        published_date: paper.published_date.clone(),
        citation_count: paper.citation_count,
        journal_ref: paper.journal_ref.clone(),
    }
}

fn venue_data(venue: &VenueRecord) -> VenueData {
    VenueData {
        id: venue.id.clone(),
        venue: venue.venue.clone(),
        volume: venue.volume.clone(),
        issue: venue.issue.clone(),
        pages: venue.pages.clone(),
    }
}

fn author_data(author: &AuthorRecord) -> AuthorData {
    AuthorData {
        id: author.id.clone(),
        name: author.name.clone(),
        affiliation: author.affiliation.clone(),
    }
}

/// Paper label: title, else arXiv id. Empty strings count as missing.
fn paper_label(paper: &PaperRecord) -> Option<String> {
    paper
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .or(paper.arxiv_id.as_deref())
        .map(str::to_string)
}

fn venue_label(venue: &VenueRecord) -> &str {
    venue
        .venue
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_VENUE)
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute what `paper` adds, given the entities seen so far.
    pub fn contribution(&self, paper: &PaperRecord) -> PaperContribution {
        let mut out = PaperContribution {
            paper: Some(paper_data(paper)),
            ..Default::default()
        };

        out.nodes.push(Node::paper(
            &paper.id,
            paper_label(paper),
            paper.citation_count.unwrap_or(0),
        ));

        if let Some(venue) = &paper.venue {
            if !self.venues.contains(&venue.id) {
                out.nodes.push(Node::venue(&venue.id, venue_label(venue)));
                out.new_venue = Some(venue_data(venue));
            }
            out.links
                .push(Link::new(&paper.id, &venue.id, LinkType::AppearedIn));
        }

        for author in &paper.authors {
            let seen = self.authors.contains(&author.id)
                || out.new_authors.iter().any(|a| a.id == author.id);
            if !seen {
                out.nodes.push(Node::author(&author.id, &author.name));
                out.new_authors.push(author_data(author));
            }
            out.links
                .push(Link::new(&author.id, &paper.id, LinkType::Published));
        }

        for reference in &paper.references {
            out.links
                .push(Link::new(&paper.id, reference, LinkType::Cited));
        }
        for citing in &paper.cited_by {
            out.links.push(Link::new(citing, &paper.id, LinkType::Cited));
        }

        out
    }

    /// Merge a contribution into the accumulators.
    pub fn merge(&mut self, contribution: PaperContribution) {
        if let Some(paper) = contribution.paper {
            let id = paper.id.clone();
            self.papers.upsert(&id, paper);
        }
        if let Some(venue) = contribution.new_venue {
            let id = venue.id.clone();
            self.venues.insert_new(&id, venue);
        }
        for author in contribution.new_authors {
            let id = author.id.clone();
            self.authors.insert_new(&id, author);
        }
        self.nodes.extend(contribution.nodes);
        self.links.extend(contribution.links);
    }

    pub fn add_paper(&mut self, paper: &PaperRecord) {
        let contribution = self.contribution(paper);
        self.merge(contribution);
    }

    pub fn statistics(&self) -> Statistics {
        Statistics {
            author_count: self.authors.len(),
            paper_count: self.papers.len(),
            venue_count: self.venues.len(),
        }
    }

    pub fn finish(self) -> ExportGraph {
        let statistics = self.statistics();
        ExportGraph {
            statistics,
            nodes: self.nodes,
            links: self.links,
            authors: self.authors.into_values(),
            papers: self.papers.into_values(),
            venues: self.venues.into_values(),
        }
    }
}

/// Run the deduplication pass over all papers.
pub fn build_graph(papers: &[PaperRecord]) -> ExportGraph {
    let mut builder = GraphBuilder::new();
    for paper in papers {
        builder.add_paper(paper);
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use papergraph_model::NodeType;

    fn author(id: &str, name: &str) -> AuthorRecord {
        AuthorRecord {
            id: id.into(),
            name: name.into(),
            affiliation: None,
        }
    }

    fn venue(id: &str, name: Option<&str>) -> VenueRecord {
        VenueRecord {
            id: id.into(),
            venue: name.map(String::from),
            volume: None,
            issue: None,
            pages: None,
        }
    }

    fn paper(id: &str) -> PaperRecord {
        PaperRecord {
            id: id.into(),
            arxiv_id: Some(format!("arxiv-{id}")),
            title: Some(format!("Title {id}")),
            ..Default::default()
        }
    }

    fn count_links(graph: &ExportGraph, kind: LinkType) -> usize {
        graph.links.iter().filter(|l| l.link_type == kind).count()
    }

    fn count_nodes(graph: &ExportGraph, kind: NodeType) -> usize {
        graph.nodes.iter().filter(|n| n.node_type == kind).count()
    }

    #[test]
    fn single_paper_two_authors_one_venue() {
        let mut p = paper("p1");
        p.authors = vec![author("a1", "Ada"), author("a2", "Bob")];
        p.venue = Some(venue("v1", Some("NeurIPS")));

        let graph = build_graph(&[p]);

        assert_eq!(count_links(&graph, LinkType::Published), 2);
        assert_eq!(count_links(&graph, LinkType::AppearedIn), 1);
        assert_eq!(count_nodes(&graph, NodeType::Paper), 1);
        assert_eq!(count_nodes(&graph, NodeType::Author), 2);
        // venue is new, so it gets a node too
        assert_eq!(count_nodes(&graph, NodeType::Venue), 1);
        assert_eq!(
            graph.statistics,
            Statistics {
                author_count: 2,
                paper_count: 1,
                venue_count: 1
            }
        );
    }

    #[test]
    fn shared_venue_adds_edge_not_node() {
        let mut p1 = paper("p1");
        p1.venue = Some(venue("v1", Some("ICML")));
        let mut p2 = paper("p2");
        p2.venue = Some(venue("v1", Some("ICML")));

        let graph = build_graph(&[p1, p2]);

        assert_eq!(count_nodes(&graph, NodeType::Venue), 1);
        assert_eq!(count_links(&graph, LinkType::AppearedIn), 2);
        assert_eq!(graph.statistics.venue_count, 1);
    }

    #[test]
    fn shared_author_adds_edge_not_node() {
        let mut p1 = paper("p1");
        p1.authors = vec![author("a1", "Ada")];
        let mut p2 = paper("p2");
        p2.authors = vec![author("a1", "Ada")];

        let graph = build_graph(&[p1, p2]);

        assert_eq!(count_nodes(&graph, NodeType::Author), 1);
        assert_eq!(count_links(&graph, LinkType::Published), 2);
    }

    #[test]
    fn author_listed_twice_on_one_paper() {
        let mut p = paper("p1");
        p.authors = vec![author("a1", "Ada"), author("a1", "Ada")];

        let graph = build_graph(&[p]);

        assert_eq!(count_nodes(&graph, NodeType::Author), 1);
        assert_eq!(count_links(&graph, LinkType::Published), 2);
        assert_eq!(graph.statistics.author_count, 1);
    }

    #[test]
    fn mutual_citation_keeps_both_edges() {
        let mut a = paper("A");
        a.references = vec!["B".into()];
        let mut b = paper("B");
        b.references = vec!["A".into()];

        let graph = build_graph(&[a, b]);

        assert_eq!(count_links(&graph, LinkType::Cited), 2);
        assert!(graph
            .links
            .contains(&Link::new("A", "B", LinkType::Cited)));
        assert!(graph
            .links
            .contains(&Link::new("B", "A", LinkType::Cited)));
    }

    #[test]
    fn citation_seen_from_both_sides_is_duplicated() {
        // A cites B, stored as A.references and as B.cited_by
        let mut a = paper("A");
        a.references = vec!["B".into()];
        let mut b = paper("B");
        b.cited_by = vec!["A".into()];

        let graph = build_graph(&[a, b]);

        assert_eq!(count_links(&graph, LinkType::Cited), 2);
        assert!(graph
            .links
            .iter()
            .all(|l| l.source == "A" && l.target == "B"));
    }

    #[test]
    fn paper_label_fallbacks() {
        let mut titled = paper("p1");
        titled.title = Some("Graph Title".into());
        let mut untitled = paper("p2");
        untitled.title = None;
        let mut empty_title = paper("p3");
        empty_title.title = Some(String::new());
        let bare = PaperRecord {
            id: "p4".into(),
            ..Default::default()
        };

        let graph = build_graph(&[titled, untitled, empty_title, bare]);
        let labels: Vec<_> = graph.nodes.iter().map(|n| n.label.as_deref()).collect();

        assert_eq!(
            labels,
            [
                Some("Graph Title"),
                Some("arxiv-p2"),
                Some("arxiv-p3"),
                None
            ]
        );
    }

    #[test]
    fn unnamed_venue_label() {
        let mut p = paper("p1");
        p.venue = Some(venue("v1", None));

        let graph = build_graph(&[p]);
        let venue_node = graph
            .nodes
            .iter()
            .find(|n| n.node_type == NodeType::Venue)
            .unwrap();

        assert_eq!(venue_node.label.as_deref(), Some(UNKNOWN_VENUE));
        assert_eq!(venue_node.citation_count, None);
    }

    #[test]
    fn citation_count_defaults_to_zero_on_node() {
        let mut p = paper("p1");
        p.citation_count = None;

        let graph = build_graph(&[p]);

        assert_eq!(graph.nodes[0].citation_count, Some(0));
        assert_eq!(graph.papers[0].citation_count, None);
    }

    #[test]
    fn repeated_paper_id_counts_once() {
        let mut first = paper("p1");
        first.title = Some("old".into());
        let other = paper("p2");
        let mut again = paper("p1");
        again.title = Some("new".into());

        let graph = build_graph(&[first, other, again]);

        assert_eq!(graph.statistics.paper_count, 2);
        // overwritten value, original position
        assert_eq!(graph.papers[0].id, "p1");
        assert_eq!(graph.papers[0].title.as_deref(), Some("new"));
        // a node is pushed per visit
        assert_eq!(count_nodes(&graph, NodeType::Paper), 3);
    }

    #[test]
    fn node_order_follows_visit_order() {
        let mut p1 = paper("p1");
        p1.venue = Some(venue("v1", Some("V")));
        p1.authors = vec![author("a1", "Ada")];
        let mut p2 = paper("p2");
        p2.authors = vec![author("a2", "Bob"), author("a1", "Ada")];

        let graph = build_graph(&[p1, p2]);
        let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();

        assert_eq!(ids, ["p1", "v1", "a1", "p2", "a2"]);
        let author_ids: Vec<_> = graph.authors.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(author_ids, ["a1", "a2"]);
    }

    #[test]
    fn links_reference_known_nodes_or_papers() {
        let mut p1 = paper("p1");
        p1.authors = vec![author("a1", "Ada")];
        p1.venue = Some(venue("v1", Some("V")));

        let graph = build_graph(&[p1]);
        for link in &graph.links {
            assert!(graph.nodes.iter().any(|n| n.id == link.source));
            assert!(graph.nodes.iter().any(|n| n.id == link.target));
        }
    }

    #[test]
    fn empty_input() {
        let graph = build_graph(&[]);
        assert!(graph.nodes.is_empty());
        assert!(graph.links.is_empty());
        assert_eq!(graph.statistics, Statistics::default());
    }
}
