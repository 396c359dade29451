//! Guarded-edge graph executor.
//!
//! Nodes and edges are plain data: traversal picks the first outgoing edge
//! (in declared order) whose guard holds, falling back to the declared
//! default edge. A step bound catches miswired cycles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::llm::LanguageModel;
use crate::pipeline::node::{run_node, NodeKind, PipelineLimits};
use crate::pipeline::state::PipelineState;
use crate::transcript::TranscriptStore;

/// Errors halting a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A node's capability call or precondition failed. Carries the failing
    /// node and a JSON snapshot of the state at failure.
    #[error("node {node} failed: {source}")]
    Node {
        node: NodeKind,
        snapshot: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("pipeline exceeded the step bound of {max_steps} steps")]
    GraphLoop { max_steps: usize },

    #[error("no outgoing edge applies at node {node}")]
    NoPath { node: NodeKind },

    #[error("pipeline run cancelled")]
    Cancelled,

    #[error("invalid graph: {0}")]
    InvalidGraph(String),
}

/// A pure predicate over the run state, used to pick edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// The text window hit its size bound with transcript still unconsumed.
    WindowFull,
    /// Unconsumed transcript records remain past the cursor.
    TranscriptRemaining,
    /// At least one keyword has no research note yet.
    HasUnresolvedKeywords,
}

impl Guard {
    pub fn evaluate(&self, state: &PipelineState, store: &TranscriptStore) -> bool {
        match self {
            Self::WindowFull => state.window_full,
            Self::TranscriptRemaining => state.cursor < store.len(),
            Self::HasUnresolvedKeywords => !state.unresolved_keywords().is_empty(),
        }
    }
}

/// One directed edge. `guard: None` marks the node's default edge.
#[derive(Debug, Clone)]
pub struct PipelineEdge {
    pub from: NodeKind,
    pub to: NodeKind,
    pub guard: Option<Guard>,
}

impl PipelineEdge {
    pub fn guarded(from: NodeKind, to: NodeKind, guard: Guard) -> Self {
        Self {
            from,
            to,
            guard: Some(guard),
        }
    }

    pub fn default_edge(from: NodeKind, to: NodeKind) -> Self {
        Self {
            from,
            to,
            guard: None,
        }
    }
}

/// A validated node graph: edge list plus start node. Nodes with no outgoing
/// edges are terminal.
#[derive(Debug, Clone)]
pub struct Graph {
    start: NodeKind,
    edges: Vec<PipelineEdge>,
}

impl Graph {
    /// Build a graph, rejecting shapes that could never run to completion.
    pub fn new(start: NodeKind, edges: Vec<PipelineEdge>) -> Result<Self, PipelineError> {
        let graph = Self { start, edges };

        let has_terminal = graph
            .nodes()
            .iter()
            .any(|&node| graph.outgoing(node).next().is_none());
        if !has_terminal {
            return Err(PipelineError::InvalidGraph(
                "graph has no terminal node".to_string(),
            ));
        }

        for edge in &graph.edges {
            let multiple_defaults = graph
                .outgoing(edge.from)
                .filter(|e| e.guard.is_none())
                .count()
                > 1;
            if multiple_defaults {
                return Err(PipelineError::InvalidGraph(format!(
                    "node {} declares more than one default edge",
                    edge.from
                )));
            }
        }

        Ok(graph)
    }

    /// The standard recap wiring:
    ///
    /// ```text
    /// SpeakerDetect → TextAccumulate → KeywordExtract ──[unresolved]──► Research
    ///        ▲                  │            │                            │
    ///        │                  │            ├──[remaining]──► TextAccumulate
    ///        └──────────────────┘            └── default ───► Summarize ◄─┘
    /// ```
    pub fn standard() -> Self {
        use Guard::*;
        use NodeKind::*;

        Self {
            start: SpeakerDetect,
            edges: vec![
                PipelineEdge::default_edge(SpeakerDetect, TextAccumulate),
                PipelineEdge::guarded(TextAccumulate, KeywordExtract, WindowFull),
                PipelineEdge::default_edge(TextAccumulate, KeywordExtract),
                PipelineEdge::guarded(KeywordExtract, Research, HasUnresolvedKeywords),
                PipelineEdge::guarded(KeywordExtract, TextAccumulate, TranscriptRemaining),
                PipelineEdge::default_edge(KeywordExtract, Summarize),
                PipelineEdge::guarded(Research, TextAccumulate, TranscriptRemaining),
                PipelineEdge::default_edge(Research, Summarize),
            ],
        }
    }

    pub fn start(&self) -> NodeKind {
        self.start
    }

    fn outgoing(&self, node: NodeKind) -> impl Iterator<Item = &PipelineEdge> {
        self.edges.iter().filter(move |edge| edge.from == node)
    }

    fn nodes(&self) -> Vec<NodeKind> {
        let mut nodes = vec![self.start];
        for edge in &self.edges {
            nodes.push(edge.from);
            nodes.push(edge.to);
        }
        nodes.sort();
        nodes.dedup();
        nodes
    }

    /// Pick the next node from `node`: first guarded edge that holds, else
    /// the default edge.
    fn next(
        &self,
        node: NodeKind,
        state: &PipelineState,
        store: &TranscriptStore,
    ) -> Result<Option<NodeKind>, PipelineError> {
        let mut saw_edge = false;
        for edge in self.outgoing(node) {
            saw_edge = true;
            if let Some(guard) = edge.guard {
                if guard.evaluate(state, store) {
                    return Ok(Some(edge.to));
                }
            }
        }

        if !saw_edge {
            // Terminal node.
            return Ok(None);
        }

        self.outgoing(node)
            .find(|edge| edge.guard.is_none())
            .map(|edge| Some(edge.to))
            .ok_or(PipelineError::NoPath { node })
    }
}

/// Drives a graph over one transcript, threading the state through each node
/// strictly sequentially.
pub struct Executor<'a> {
    graph: &'a Graph,
    model: &'a dyn LanguageModel,
    limits: PipelineLimits,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> Executor<'a> {
    pub fn new(graph: &'a Graph, model: &'a dyn LanguageModel, limits: PipelineLimits) -> Self {
        Self {
            graph,
            model,
            limits,
            cancel: None,
        }
    }

    /// Install a cooperative cancellation flag, checked between node steps.
    /// A node's in-flight capability call is always awaited to completion.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Run the graph to a terminal node and return the final state.
    pub async fn run(&self, store: &TranscriptStore) -> Result<PipelineState, PipelineError> {
        let run_id = Uuid::new_v4();
        let mut state = PipelineState::new();
        let mut current = self.graph.start();
        let mut steps = 0usize;

        tracing::info!(%run_id, records = store.len(), "pipeline run started");

        loop {
            if let Some(cancel) = &self.cancel {
                if cancel.load(Ordering::Relaxed) {
                    tracing::info!(%run_id, steps, "pipeline run cancelled");
                    return Err(PipelineError::Cancelled);
                }
            }

            steps += 1;
            if steps > self.limits.max_steps {
                return Err(PipelineError::GraphLoop {
                    max_steps: self.limits.max_steps,
                });
            }

            tracing::debug!(%run_id, node = %current, step = steps, "running node");
            run_node(current, &mut state, store, self.model, &self.limits)
                .await
                .map_err(|source| {
                    let snapshot = state.snapshot_json();
                    tracing::error!(%run_id, node = %current, error = %source, "node failed");
                    PipelineError::Node {
                        node: current,
                        snapshot,
                        source,
                    }
                })?;

            match self.graph.next(current, &state, store)? {
                Some(next) => current = next,
                None => break,
            }
        }

        tracing::info!(
            %run_id,
            steps,
            speakers = state.speakers.len(),
            keywords = state.keywords.len(),
            "pipeline run complete"
        );
        Ok(state)
    }
}
