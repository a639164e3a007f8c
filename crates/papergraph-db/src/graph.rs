//! Read the store as exporter input

use anyhow::{Context, Result};
use papergraph_export::{AuthorRecord, GraphSource, PaperRecord, VenueRecord};
use rustc_hash::FxHashMap;

use crate::store::Database;

type Grouped<T> = FxHashMap<String, Vec<T>>;

impl Database {
    fn paper_rows(&self) -> Result<Vec<PaperRecord>> {
        let mut stmt = self.conn().prepare(
            "SELECT p.id, p.arxiv_id, p.title, p.abstract, p.published_date, p.journal_ref, \
             s.citation_count \
             FROM papers p LEFT JOIN s2_papers s ON s.paper_id = p.id \
             ORDER BY p.seq",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(PaperRecord {
                    id: row.get(0)?,
                    arxiv_id: row.get(1)?,
                    title: row.get(2)?,
                    abstract_text: row.get(3)?,
                    published_date: row.get(4)?,
                    journal_ref: row.get(5)?,
                    citation_count: row.get(6)?,
                    ..Default::default()
                })
            })?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn authors_by_paper(&self) -> Result<Grouped<AuthorRecord>> {
        let mut stmt = self.conn().prepare(
            "SELECT pa.paper_id, a.id, a.name, a.affiliation \
             FROM paper_authors pa JOIN authors a ON a.id = pa.author_id \
             ORDER BY pa.paper_id, pa.position",
        )?;
        let mut grouped = Grouped::default();
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                AuthorRecord {
                    id: row.get(1)?,
                    name: row.get(2)?,
                    affiliation: row.get(3)?,
                },
            ))
        })?;
        for row in rows {
            let (paper_id, author) = row?;
            grouped.entry(paper_id).or_insert_with(Vec::new).push(author);
        }
        Ok(grouped)
    }

    fn venues_by_paper(&self) -> Result<FxHashMap<String, VenueRecord>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT paper_id, id, venue, volume, issue, pages FROM venues")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                VenueRecord {
                    id: row.get(1)?,
                    venue: row.get(2)?,
                    volume: row.get(3)?,
                    issue: row.get(4)?,
                    pages: row.get(5)?,
                },
            ))
        })?;
        Ok(rows.collect::<duckdb::Result<_>>()?)
    }

    /// (references, cited_by), both in insertion order
    fn edges(&self) -> Result<(Grouped<String>, Grouped<String>)> {
        let mut stmt = self
            .conn()
            .prepare("SELECT paper_id, reference_id FROM paper_references ORDER BY rowid")?;
        let mut references = Grouped::default();
        let mut cited_by = Grouped::default();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (citing, cited) = row?;
            references
                .entry(citing.clone())
                .or_insert_with(Vec::new)
                .push(cited.clone());
            cited_by.entry(cited).or_insert_with(Vec::new).push(citing);
        }
        Ok((references, cited_by))
    }
}

impl GraphSource for Database {
    fn papers(&self) -> Result<Vec<PaperRecord>> {
        let mut papers = self.paper_rows().context("Failed to read papers")?;
        let mut authors = self.authors_by_paper().context("Failed to read authors")?;
        let mut venues = self.venues_by_paper().context("Failed to read venues")?;
        let (mut references, mut cited_by) =
            self.edges().context("Failed to read references")?;

        for paper in &mut papers {
            paper.authors = authors.remove(&paper.id).unwrap_or_default();
            paper.venue = venues.remove(&paper.id);
            paper.references = references.remove(&paper.id).unwrap_or_default();
            paper.cited_by = cited_by.remove(&paper.id).unwrap_or_default();
        }
        log::debug!("read {} papers from store", papers.len());
        Ok(papers)
    }
}

#[cfg(test)]
mod tests {
    use papergraph_arxiv::ArxivPaper;
    use papergraph_export::build_graph;
    use papergraph_semantic_scholar::RelatedPaper;

    use super::*;
    use crate::store::Step;

    fn related(arxiv_id: &str, venue: Option<&str>) -> RelatedPaper {
        RelatedPaper {
            arxiv_id: arxiv_id.into(),
            arxiv_url: format!("https://arxiv.org/abs/{arxiv_id}"),
            title: Some(format!("Paper {arxiv_id}")),
            authors: None,
            abstract_text: None,
            published_date: None,
            s2_paper_id: Some(format!("s2-{arxiv_id}")),
            url: None,
            citation_count: Some(3),
            influential_citation_count: None,
            open_access_pdf_url: None,
            publication_types: None,
            fields_of_study: Vec::new(),
            venue: venue.map(str::to_string),
            volume: None,
            issue: None,
            pages: None,
            author_details: Vec::new(),
        }
    }

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        let (root, _) = db.ensure_paper("1706.03762", "").unwrap();
        db.save_arxiv_metadata(
            &root.id,
            &ArxivPaper {
                title: Some("Attention Is All You Need".into()),
                authors: vec!["Ashish Vaswani".into(), "Noam Shazeer".into()],
                ..Default::default()
            },
        )
        .unwrap();

        let reference = db.save_related_paper(&related("1409.0473", Some("ICLR"))).unwrap();
        db.add_reference(&root.id, &reference.id).unwrap();
        let citing = db.save_related_paper(&related("1810.04805", None)).unwrap();
        db.add_reference(&citing.id, &root.id).unwrap();
        db
    }

    #[test]
    fn papers_carry_their_relations() {
        let db = seeded();
        let papers = db.papers().unwrap();

        let ids: Vec<_> = papers.iter().filter_map(|p| p.arxiv_id.as_deref()).collect();
        assert_eq!(ids, ["1706.03762", "1409.0473", "1810.04805"]);

        let root = &papers[0];
        assert_eq!(
            root.authors.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(),
            ["Ashish Vaswani", "Noam Shazeer"]
        );
        assert_eq!(root.references, [papers[1].id.clone()]);
        assert_eq!(root.cited_by, [papers[2].id.clone()]);
        assert_eq!(root.citation_count, None);

        assert_eq!(papers[1].citation_count, Some(3));
        assert_eq!(
            papers[1].venue.as_ref().and_then(|v| v.venue.as_deref()),
            Some("ICLR")
        );
        assert!(papers[2].venue.is_none());
    }

    #[test]
    fn store_feeds_graph_builder() {
        let db = seeded();
        let graph = build_graph(&db.papers().unwrap());
        assert_eq!(graph.statistics.paper_count, 3);
        assert_eq!(graph.statistics.author_count, 2);
        assert_eq!(graph.statistics.venue_count, 1);
        assert_eq!(db.pending(Step::References).unwrap().len(), 3);
    }
}
