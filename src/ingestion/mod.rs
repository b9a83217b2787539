//! Document ingestion: conversion, chunking, batch embedding, index writes

pub mod batch;
pub mod converter;
pub mod pipeline;
pub mod splitter;

pub use batch::embed_in_batches;
pub use converter::{FileConverter, ParsedDocument};
pub use pipeline::IngestPipeline;
pub use splitter::ChunkSplitter;
