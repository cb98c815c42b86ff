pub type Result<T> = std::result::Result<T, DagError>;

#[derive(Debug, thiserror::Error)]
pub enum DagError {
    #[error("duplicate node id: {id}")]
    DuplicateNode { id: String },

    #[error("unknown node id: {id}")]
    UnknownNode { id: String },

    #[error("edge {from} -> {to} must span exactly one row (rows {from_row} and {to_row})")]
    RowSpan {
        from: String,
        to: String,
        from_row: i32,
        to_row: i32,
    },
}
