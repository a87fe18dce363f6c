use binviz_common::error::BinvizCommonError;

#[derive(Debug, thiserror::Error)]
pub enum BinvizScaleError {
    #[error("Invalid timezone: `{0}`")]
    InvalidTimezone(String),

    #[error("Timestamp out of range: {0}")]
    InvalidTimestamp(f64),

    #[error("Axis is marked as aggregate but no aggregate transform was supplied")]
    MissingAggregateContext,

    #[error(transparent)]
    CommonError(#[from] BinvizCommonError),
}
