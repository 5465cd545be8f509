pub mod ports;
pub mod acquire_use_case;
pub mod filter_use_case;
pub mod enrich_use_case;
pub mod score_use_case;
