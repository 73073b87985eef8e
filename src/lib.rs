pub mod analyzers;
pub mod config;
pub mod locations;
pub mod output;
pub mod parser;
