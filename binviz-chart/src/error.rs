use binviz_common::error::BinvizCommonError;
use binviz_scales::error::BinvizScaleError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BinvizChartError {
    #[error("Unknown filter graph node: `{0}`")]
    UnknownNode(usize),

    #[error("Invalid configuration: `{0}`")]
    ConfigError(#[from] serde_json::Error),

    #[error("Scale error: `{0}`")]
    ScaleError(#[from] BinvizScaleError),

    #[error("Data error: `{0}`")]
    CommonError(#[from] BinvizCommonError),
}
