use crate::brush::BrushRole;

#[derive(Debug, thiserror::Error)]
pub enum BinvizCommonError {
    #[error("Invalid bin key: `{0}`")]
    InvalidBinKey(String),

    #[error("Brush role {0:?} appears more than once in the result")]
    DuplicateBrushRole(BrushRole),

    #[error("Unrecognized bin range shape: `{0}`")]
    UnrecognizedBinRange(String),

    #[error("Attribute `{0}` is not a calculated attribute")]
    NotCalculated(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
