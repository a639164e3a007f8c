//! DDL for the paper store.
//!
//! `papers.seq` gives a stable processing order; statuses are one of
//! `pending|processing|completed|failed`.

pub const SCHEMA: &str = "
CREATE SEQUENCE IF NOT EXISTS papers_seq START 1;

CREATE TABLE IF NOT EXISTS papers (
    id VARCHAR PRIMARY KEY,
    seq BIGINT NOT NULL DEFAULT nextval('papers_seq'),
    arxiv_id VARCHAR NOT NULL UNIQUE,
    arxiv_url VARCHAR,
    title VARCHAR,
    abstract VARCHAR,
    authors_text VARCHAR,
    published_date VARCHAR,
    journal_ref VARCHAR,
    arxiv_status VARCHAR NOT NULL DEFAULT 'pending',
    references_status VARCHAR NOT NULL DEFAULT 'pending',
    citations_status VARCHAR NOT NULL DEFAULT 'pending',
    processed_at TIMESTAMP,
    references_fetched_at TIMESTAMP,
    citations_fetched_at TIMESTAMP,
    created_at TIMESTAMP NOT NULL DEFAULT current_timestamp
);

CREATE TABLE IF NOT EXISTS authors (
    id VARCHAR PRIMARY KEY,
    name VARCHAR NOT NULL,
    affiliation VARCHAR
);

CREATE TABLE IF NOT EXISTS paper_authors (
    paper_id VARCHAR NOT NULL,
    author_id VARCHAR NOT NULL,
    position INTEGER NOT NULL,
    PRIMARY KEY (paper_id, author_id)
);

CREATE TABLE IF NOT EXISTS s2_papers (
    paper_id VARCHAR PRIMARY KEY,
    s2_paper_id VARCHAR UNIQUE,
    url VARCHAR,
    citation_count BIGINT,
    influential_citation_count BIGINT,
    open_access_pdf_url VARCHAR,
    publication_types VARCHAR
);

CREATE TABLE IF NOT EXISTS s2_fields (
    paper_id VARCHAR NOT NULL,
    category VARCHAR,
    field VARCHAR NOT NULL
);

CREATE TABLE IF NOT EXISTS venues (
    id VARCHAR PRIMARY KEY,
    paper_id VARCHAR NOT NULL UNIQUE,
    venue VARCHAR,
    volume VARCHAR,
    issue VARCHAR,
    pages VARCHAR
);

CREATE TABLE IF NOT EXISTS paper_references (
    paper_id VARCHAR NOT NULL,
    reference_id VARCHAR NOT NULL,
    PRIMARY KEY (paper_id, reference_id)
);

CREATE SEQUENCE IF NOT EXISTS network_requests_seq START 1;

CREATE TABLE IF NOT EXISTS network_requests (
    id BIGINT PRIMARY KEY DEFAULT nextval('network_requests_seq'),
    source VARCHAR NOT NULL,
    request_url VARCHAR NOT NULL,
    request_method VARCHAR NOT NULL,
    request_headers VARCHAR,
    response_status INTEGER,
    response_headers VARCHAR,
    response_body VARCHAR,
    duration_ms BIGINT,
    success BOOLEAN NOT NULL,
    error_message VARCHAR,
    arxiv_id VARCHAR,
    created_at TIMESTAMP NOT NULL DEFAULT current_timestamp
);
";
