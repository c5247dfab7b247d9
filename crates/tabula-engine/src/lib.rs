//! tabula_engine - Formula model, cell locations and the text parser.

pub mod engine;
