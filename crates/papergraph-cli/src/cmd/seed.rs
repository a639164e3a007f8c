//! `papergraph seed` - add a paper to process

use anyhow::Result;
use clap::Args;
use papergraph_arxiv::normalize_arxiv_id;
use papergraph_semantic_scholar::schema::ARXIV_ABS_URL;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct SeedArgs {
    /// arXiv URL (abs or pdf) or bare id
    pub paper: String,
}

pub fn run(args: SeedArgs, config: &Config) -> Result<()> {
    let Some(arxiv_id) = normalize_arxiv_id(&args.paper) else {
        anyhow::bail!("not an arXiv URL or id: {:?}", args.paper);
    };
    let db = super::open_database(config)?;
    let url = format!("{ARXIV_ABS_URL}/{arxiv_id}");

    let (paper, created) = db.ensure_paper(&arxiv_id, &url)?;
    if created {
        eprintln!("Seeded {arxiv_id} ({})", paper.id);
    } else {
        eprintln!(
            "{arxiv_id} already present (arXiv: {}, references: {}, citations: {})",
            paper.arxiv_status, paper.references_status, paper.citations_status
        );
    }
    Ok(())
}
