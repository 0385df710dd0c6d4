pub mod benefits;
pub mod ingest;
pub mod narrative;
pub mod pipeline;
