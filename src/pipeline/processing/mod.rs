// Pure record transforms for each stage

pub mod filter;
pub mod enrich;
pub mod research_response;
pub mod score;
