//! Binary encoding of persisted matches.

use thiserror::Error;

use crate::game::MatchState;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode match state: {0}")]
    Encode(#[source] bincode::Error),
    #[error("failed to decode match state: {0}")]
    Decode(#[source] bincode::Error),
}

/// Encode a match snapshot with bincode.
pub fn encode(state: &MatchState) -> Result<Vec<u8>, CodecError> {
    bincode::serialize(state).map_err(CodecError::Encode)
}

/// Decode a snapshot. The result is not validated; pass it to
/// [`Match::from_state`](crate::Match::from_state) before use.
pub fn decode(bytes: &[u8]) -> Result<MatchState, CodecError> {
    bincode::deserialize(bytes).map_err(CodecError::Decode)
}
