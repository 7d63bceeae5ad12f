pub mod history;
pub mod ingestion;
