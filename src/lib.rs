pub mod analyzers;
pub mod output;
pub mod parser;
pub mod selection;
pub mod stats;
pub mod table;
