//! Error types surfaced by the editor core.
//!
//! `Display` strings are the user-facing messages; hosts show them verbatim.

use thiserror::Error;

use crate::model::NodeId;

/// Structural problems found by [`StoryGraph::validate`](crate::model::StoryGraph::validate)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("graph has no scenes")]
    NoScenes,
    #[error("id {0} is used by more than one node")]
    DuplicateId(NodeId),
    #[error("group {0} has no members")]
    EmptyGroup(NodeId),
    #[error("group {group} lists unknown scene {scene}")]
    MissingMember { group: NodeId, scene: NodeId },
    #[error("scene {0} belongs to more than one group")]
    MultipleGroups(NodeId),
    #[error("choice on {origin} points at unknown node {target}")]
    DanglingChoice { origin: NodeId, target: NodeId },
}

/// Rejected editing operations; the graph is untouched when one is returned
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error("連接無效：群組內的卡片只能連線到同群組內的卡片，群組外的卡片只能連線到群組外的卡片或群組本體。")]
    InvalidConnection { origin: NodeId, target: NodeId },
    #[error("至少需要一個場景")]
    LastScene,
    #[error("unknown scene {0}")]
    UnknownScene(NodeId),
    #[error("unknown group {0}")]
    UnknownGroup(NodeId),
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    #[error("choice {index} does not exist on {origin}")]
    UnknownChoice { origin: NodeId, index: usize },
    #[error("請填寫遊戲標題")]
    MissingTitle,
}

/// Failures of the asynchronous graph generation round-trip
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    #[error("a generation request is already in flight")]
    AlreadyInFlight,
    #[error("no generation request is in flight")]
    NotInFlight,
    #[error("點數不足！需要 {required} 點，目前擁有 {available} 點。")]
    InsufficientPoints { required: u32, available: u32 },
    #[error("交易失敗")]
    TransactionFailed,
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("生成失敗，請稍後再試。（點數已返還）")]
    Backend(String),
    #[error("generated graph is invalid: {0}")]
    InvalidGraph(#[from] GraphError),
}

/// Failures of the key-value game repository
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("failed to encode or decode game record: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("game {0} not found")]
    NotFound(String),
}
