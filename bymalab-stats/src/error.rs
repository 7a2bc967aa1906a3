use crate::since::SinceKind;
use bymalab_core::data::CacheError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("no complete rows left for var since {kind}")]
    NoCompleteRows { kind: SinceKind },

    #[error("unknown metric '{name}' (expected max, min or {label})")]
    UnknownKind { name: String, label: String },

    #[error("implied rate has no values: check {local} and {foreign}")]
    EmptyRate { local: String, foreign: String },

    #[error("no share capital figures for {ticker}")]
    NoCapital { ticker: String },
}
