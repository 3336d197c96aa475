pub mod alphafold;
pub mod cache;
pub mod cleaver;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod output;
pub mod rcsb;
pub mod records;
pub mod source;
pub mod uniprot;
