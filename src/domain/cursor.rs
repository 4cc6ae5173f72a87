use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

use super::RankingError;
use crate::models::{RankKey, UserId};

const CURSOR_PREFIX: &str = "rank:";

/// Encode a rank key as an opaque cursor: base64url of `rank:<score>:<user_id>`
pub fn encode_cursor(key: &RankKey) -> String {
    URL_SAFE_NO_PAD.encode(format!("{}{}:{}", CURSOR_PREFIX, key.score, key.user_id))
}

/// Decode a cursor produced by [`encode_cursor`]
pub fn decode_cursor(cursor: &str) -> Result<RankKey, RankingError> {
    let invalid = || RankingError::InvalidInput(format!("Malformed cursor: {:?}", cursor));

    let bytes = URL_SAFE_NO_PAD.decode(cursor).map_err(|_| invalid())?;
    let text = String::from_utf8(bytes).map_err(|_| invalid())?;
    let (score, user_id) = text
        .strip_prefix(CURSOR_PREFIX)
        .and_then(|rest| rest.split_once(':'))
        .ok_or_else(invalid)?;

    Ok(RankKey {
        score: score.parse().map_err(|_| invalid())?,
        user_id: UserId(user_id.parse().map_err(|_| invalid())?),
    })
}
