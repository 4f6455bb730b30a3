use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error(
        "position must be one of 'before', 'after', 'into', 'first' or 'last', got: {0}"
    )]
    InvalidPosition(String),

    #[error("cannot place {node_id} relative to itself")]
    SelfReference { node_id: String },

    #[error("cannot move {node_id} relative to its own descendant {ref_id}")]
    CyclicMove { node_id: String, ref_id: String },

    #[error("tree contains a node with no value")]
    MissingValue,

    #[error("mug already present in tree: {node_id}")]
    DuplicateMug { node_id: String },

    #[error("node handle no longer refers to a live node")]
    StaleNode,
}

pub type TreeResult<T> = Result<T, TreeError>;
