// File: ./src/transcript.rs
//! Decoding of dictation results into plain text.
//!
//! The iFlytek IAT engine returns one JSON fragment per recognized segment:
//! `{"ws":[{"cw":[{"w":"明天"}]},{"cw":[{"w":"七点"}]}]}`. Each `ws` entry holds
//! candidate words; the first candidate is the one we keep.
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct IatResult {
    #[serde(default)]
    ws: Vec<IatWordSlot>,
}

#[derive(Debug, Deserialize)]
struct IatWordSlot {
    #[serde(default)]
    cw: Vec<IatCandidate>,
}

#[derive(Debug, Deserialize)]
struct IatCandidate {
    #[serde(default)]
    w: String,
}

/// Concatenates the first candidate of every word slot.
/// Malformed JSON yields an empty string and a warning.
pub fn parse_iat_result(json: &str) -> String {
    match serde_json::from_str::<IatResult>(json) {
        Ok(result) => result
            .ws
            .iter()
            .filter_map(|slot| slot.cw.first())
            .map(|c| c.w.as_str())
            .collect(),
        Err(e) => {
            log::warn!("Failed to decode IAT result: {}", e);
            String::new()
        }
    }
}

/// Joins several IAT fragments (one per streamed segment) into a transcript.
pub fn join_iat_results<'a, I>(fragments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    fragments.into_iter().map(parse_iat_result).collect()
}
