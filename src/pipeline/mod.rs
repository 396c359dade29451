//! Pipeline module for recap
//!
//! A small directed graph of processing nodes is driven over an immutable
//! transcript, threading a mutable accumulator state through speaker
//! detection, text accumulation, keyword extraction, research, and
//! summarization.

mod graph;
mod node;
mod state;
mod summary;

pub use graph::{Executor, Graph, Guard, PipelineEdge, PipelineError};
pub use node::{
    run_node, NodeKind, PipelineLimits, DEFAULT_MAX_KEYWORDS, DEFAULT_MAX_STEPS,
    DEFAULT_WINDOW_CHARS,
};
pub use state::{MeetingSummary, PipelineState};
pub use summary::render_summary_text;
