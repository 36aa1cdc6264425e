//! # Message Protocol
//!
//! Every frame on the wire is one JSON object terminated by `\n`. The object is
//! decoded into the generic [`Message`] envelope first (only `action` is
//! mandatory), then interpreted as a typed [`Request`] by the server or
//! checked as a response by the client.
//!
//! ## Requests
//!
//! ```text
//! {"action":"save_result","juego":"nreinas","datosPartida":{"N":4,"resuelto":true,"intentos":4},"timestamp":"..."}
//! {"action":"request_best","juego":"hanoi","timestamp":"..."}
//! {"action":"request_hint","juego":"caballo","estado":{"visitadas":[[0,0]],"actual":[0,0]},"timestamp":"..."}
//! ```
//!
//! ## Responses
//!
//! ```text
//! {"action":"confirmación","status":"ok","mensaje":"Resultado guardado","timestamp":"..."}
//! {"action":"confirmación","status":"ok","mejores":[{"id":1,"N":4,"resuelto":true,"intentos":4,"timestamp":"..."}],"timestamp":"..."}
//! {"action":"error","error":{"code":400,"mensaje":"unknown action"},"timestamp":"..."}
//! ```

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

use super::error::{ArcadeError, Result};
use crate::puzzles::hint::{no_hint_message, Hint, HintQuery};

pub const SAVE_RESULT: &str = "save_result";
pub const REQUEST_BEST: &str = "request_best";
pub const REQUEST_HINT: &str = "request_hint";
pub const CONFIRMATION: &str = "confirmación";
pub const ERROR: &str = "error";

/// Number of entries returned by `request_best`.
pub const BEST_RESULTS_LIMIT: u32 = 5;

// ============================================================================
// ENVELOPE
// ============================================================================

/// Generic protocol envelope.
///
/// `action` and `timestamp` are named fields; everything else in the JSON
/// object (`juego`, `datosPartida`, `mejores`, `error`, ...) lands in `payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(alias = "acción")]
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Message {
    /// Create a message stamped with the current UTC time.
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            timestamp: Some(current_timestamp()),
            payload: Map::new(),
        }
    }

    /// Builder-style payload insertion.
    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.payload.insert(key.to_string(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    fn require(&self, key: &str) -> Result<&Value> {
        self.get(key)
            .ok_or_else(|| ArcadeError::validation(format!("missing field {key}")))
    }

    fn game_kind(&self) -> Result<GameKind> {
        match self.require("juego")? {
            Value::String(name) => name.parse(),
            other => Err(ArcadeError::validation(format!(
                "juego must be a string, got {other}"
            ))),
        }
    }
}

// ============================================================================
// GAME RESULTS
// ============================================================================

/// The three puzzle kinds served by the arcade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameKind {
    #[serde(rename = "nreinas")]
    NQueens,
    #[serde(rename = "caballo")]
    KnightTour,
    #[serde(rename = "hanoi")]
    Hanoi,
}

impl GameKind {
    pub const ALL: [GameKind; 3] = [GameKind::NQueens, GameKind::KnightTour, GameKind::Hanoi];

    /// Protocol identifier (`juego`).
    pub fn as_str(self) -> &'static str {
        match self {
            GameKind::NQueens => "nreinas",
            GameKind::KnightTour => "caballo",
            GameKind::Hanoi => "hanoi",
        }
    }

    /// Guess the game from the fields of a `datosPartida` object.
    fn infer(fields: &Map<String, Value>) -> Option<GameKind> {
        if fields.contains_key("N") {
            Some(GameKind::NQueens)
        } else if fields.contains_key("discos") {
            Some(GameKind::Hanoi)
        } else if fields.contains_key("movimientos") {
            Some(GameKind::KnightTour)
        } else {
            None
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameKind {
    type Err = ArcadeError;

    fn from_str(s: &str) -> Result<Self> {
        GameKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ArcadeError::validation(format!("unknown game: {s}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NQueensResult {
    #[serde(rename = "N")]
    pub n: u32,
    #[serde(rename = "resuelto")]
    pub solved: bool,
    #[serde(rename = "intentos")]
    pub attempts: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnightTourResult {
    #[serde(rename = "posicion_inicial", default)]
    pub start_square: String,
    #[serde(rename = "movimientos")]
    pub moves: u32,
    #[serde(rename = "completado")]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HanoiResult {
    #[serde(rename = "discos")]
    pub disk_count: u32,
    #[serde(rename = "movimientos")]
    pub moves: u32,
    #[serde(rename = "completado")]
    pub completed: bool,
}

/// Game-specific fields of one finished session. Serializes as the flat
/// `datosPartida` object of the game it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GameOutcome {
    NQueens(NQueensResult),
    KnightTour(KnightTourResult),
    Hanoi(HanoiResult),
}

impl GameOutcome {
    pub fn kind(&self) -> GameKind {
        match self {
            GameOutcome::NQueens(_) => GameKind::NQueens,
            GameOutcome::KnightTour(_) => GameKind::KnightTour,
            GameOutcome::Hanoi(_) => GameKind::Hanoi,
        }
    }

    /// Terminal flag: `resuelto` / `completado`.
    pub fn succeeded(&self) -> bool {
        match self {
            GameOutcome::NQueens(r) => r.solved,
            GameOutcome::KnightTour(r) => r.completed,
            GameOutcome::Hanoi(r) => r.completed,
        }
    }

    /// Ranking metric, lower is better.
    pub fn quality(&self) -> u32 {
        match self {
            GameOutcome::NQueens(r) => r.attempts,
            GameOutcome::KnightTour(r) => r.moves,
            GameOutcome::Hanoi(r) => r.moves,
        }
    }

    /// Parse and validate the fields of a `datosPartida` object for `kind`.
    ///
    /// Unknown extra fields are ignored; missing or mistyped ones (including
    /// negative counters) are validation errors.
    pub fn from_fields(kind: GameKind, fields: &Value) -> Result<Self> {
        let invalid =
            |e: serde_json::Error| ArcadeError::validation(format!("invalid datosPartida for {kind}: {e}"));

        let outcome = match kind {
            GameKind::NQueens => {
                GameOutcome::NQueens(serde_json::from_value(fields.clone()).map_err(invalid)?)
            }
            GameKind::KnightTour => {
                GameOutcome::KnightTour(serde_json::from_value(fields.clone()).map_err(invalid)?)
            }
            GameKind::Hanoi => {
                GameOutcome::Hanoi(serde_json::from_value(fields.clone()).map_err(invalid)?)
            }
        };

        match &outcome {
            GameOutcome::NQueens(r) if r.n == 0 => {
                return Err(ArcadeError::validation("N must be positive"));
            }
            GameOutcome::Hanoi(r) if r.disk_count == 0 => {
                return Err(ArcadeError::validation("discos must be positive"));
            }
            _ => {}
        }
        Ok(outcome)
    }

    pub fn to_fields(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| ArcadeError::Internal {
            reason: format!("failed to encode {} result: {e}", self.kind()),
        })
    }
}

/// A finished session as reported by a game client. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameResult {
    #[serde(flatten)]
    pub outcome: GameOutcome,
    pub timestamp: DateTime<Utc>,
}

impl GameResult {
    /// Stamp an outcome with the current UTC time.
    pub fn new(outcome: GameOutcome) -> Self {
        Self {
            outcome,
            timestamp: Utc::now(),
        }
    }

    pub fn kind(&self) -> GameKind {
        self.outcome.kind()
    }

    /// Build the `save_result` request for this result.
    pub fn to_message(&self) -> Result<Message> {
        let fields = self.outcome.to_fields()?;
        Ok(Message {
            action: SAVE_RESULT.to_string(),
            timestamp: Some(format_timestamp(&self.timestamp)),
            payload: Map::new(),
        }
        .with("juego", json!(self.kind().as_str()))
        .with("datosPartida", fields))
    }
}

/// A stored result with its surrogate identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub id: i64,
    #[serde(flatten)]
    pub result: GameResult,
}

impl LeaderboardEntry {
    /// Read back one flat entry of a `mejores` list.
    pub fn from_value(kind: GameKind, value: &Value) -> Result<Self> {
        let id = value
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| ArcadeError::validation("leaderboard entry without id"))?;
        let timestamp = value
            .get("timestamp")
            .and_then(Value::as_str)
            .ok_or_else(|| ArcadeError::validation("leaderboard entry without timestamp"))
            .and_then(parse_timestamp)?;
        let outcome = GameOutcome::from_fields(kind, value)?;

        Ok(Self {
            id,
            result: GameResult { outcome, timestamp },
        })
    }
}

// ============================================================================
// TYPED REQUESTS AND RESPONSES
// ============================================================================

/// A validated client request.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    SaveResult(GameResult),
    RequestBest(GameKind),
    RequestHint(HintQuery),
}

impl TryFrom<&Message> for Request {
    type Error = ArcadeError;

    fn try_from(message: &Message) -> Result<Self> {
        match message.action.as_str() {
            SAVE_RESULT | "guardar_resultado" => {
                let fields = message.require("datosPartida")?;
                let Value::Object(map) = fields else {
                    return Err(ArcadeError::validation("datosPartida must be an object"));
                };
                let kind = match message.get("juego") {
                    Some(_) => message.game_kind()?,
                    None => GameKind::infer(map)
                        .ok_or_else(|| ArcadeError::validation("unknown game kind"))?,
                };
                let outcome = GameOutcome::from_fields(kind, fields)?;
                let timestamp = match &message.timestamp {
                    Some(ts) => parse_timestamp(ts)?,
                    None => Utc::now(),
                };
                Ok(Request::SaveResult(GameResult { outcome, timestamp }))
            }
            REQUEST_BEST | "solicitar_mejores" => Ok(Request::RequestBest(message.game_kind()?)),
            REQUEST_HINT => {
                let kind = message.game_kind()?;
                let state = message.require("estado")?;
                Ok(Request::RequestHint(HintQuery::from_state(kind, state)?))
            }
            _ => Err(ArcadeError::validation("unknown action")),
        }
    }
}

impl Request {
    /// Encode as a request envelope.
    pub fn to_message(&self) -> Result<Message> {
        match self {
            Request::SaveResult(result) => result.to_message(),
            Request::RequestBest(kind) => {
                Ok(Message::new(REQUEST_BEST).with("juego", json!(kind.as_str())))
            }
            Request::RequestHint(query) => Ok(Message::new(REQUEST_HINT)
                .with("juego", json!(query.kind().as_str()))
                .with("estado", query.to_state())),
        }
    }
}

/// Server reply to exactly one request.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Saved,
    Best(Vec<LeaderboardEntry>),
    Hint { kind: GameKind, hint: Option<Hint> },
    Error { code: u16, message: String },
}

impl Response {
    pub fn error(err: &ArcadeError) -> Self {
        Response::Error {
            code: err.status_code(),
            message: err.to_string(),
        }
    }

    pub fn into_message(self) -> Message {
        match self {
            Response::Saved => confirmation().with("mensaje", json!("Resultado guardado")),
            // An unencodable leaderboard is a server fault, never an empty list.
            Response::Best(entries) => match serde_json::to_value(entries) {
                Ok(list) => confirmation().with("mejores", list),
                Err(e) => Response::error(&ArcadeError::Internal {
                    reason: format!("failed to encode leaderboard: {e}"),
                })
                .into_message(),
            },
            Response::Hint { kind, hint } => {
                let (suggestion, text) = match hint {
                    Some(hint) => (hint.to_value(), hint.describe()),
                    None => (Value::Null, no_hint_message(kind).to_string()),
                };
                confirmation()
                    .with("sugerencia", suggestion)
                    .with("mensaje", json!(text))
            }
            Response::Error { code, message } => Message::new(ERROR)
                .with("error", json!({ "code": code, "mensaje": message })),
        }
    }
}

fn confirmation() -> Message {
    Message::new(CONFIRMATION).with("status", json!("ok"))
}

/// Turn a received response envelope into `Ok` for confirmations and
/// [`ArcadeError::Remote`] for error replies.
pub fn expect_confirmation(message: Message) -> Result<Message> {
    match message.action.as_str() {
        CONFIRMATION => Ok(message),
        ERROR => {
            let error = message.get("error");
            let code = error
                .and_then(|e| e.get("code"))
                .and_then(Value::as_u64)
                .and_then(|c| u16::try_from(c).ok())
                .unwrap_or(500);
            let text = error
                .and_then(|e| e.get("mensaje"))
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            Err(ArcadeError::Remote {
                code,
                message: text,
            })
        }
        other => Err(ArcadeError::validation(format!(
            "unexpected response action {other}"
        ))),
    }
}

// ============================================================================
// TIMESTAMPS
// ============================================================================

/// Current UTC time as ISO-8601 with a `Z` suffix.
pub fn current_timestamp() -> String {
    format_timestamp(&Utc::now())
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Accepts RFC 3339 and the naive `YYYY-mm-ddTHH:MM:SS[.ffffff]` form (read as UTC).
pub fn parse_timestamp(ts: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(ts.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| ArcadeError::validation(format!("invalid timestamp {ts}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(raw: &str) -> Message {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn save_result_with_explicit_game() {
        let msg = message(
            r#"{"action":"save_result","juego":"hanoi","datosPartida":{"discos":3,"movimientos":7,"completado":true},"timestamp":"2024-05-01T10:00:00.250000Z"}"#,
        );

        match Request::try_from(&msg).unwrap() {
            Request::SaveResult(result) => {
                assert_eq!(
                    result.outcome,
                    GameOutcome::Hanoi(HanoiResult {
                        disk_count: 3,
                        moves: 7,
                        completed: true
                    })
                );
                assert_eq!(format_timestamp(&result.timestamp), "2024-05-01T10:00:00.250000Z");
            }
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn save_result_infers_game_from_fields() {
        let msg = message(
            r#"{"action":"save_result","datosPartida":{"N":4,"resuelto":true,"intentos":4},"timestamp":"2024-05-01T10:00:00Z"}"#,
        );
        let Request::SaveResult(result) = Request::try_from(&msg).unwrap() else {
            panic!("expected save_result");
        };
        assert_eq!(result.kind(), GameKind::NQueens);

        let msg = message(
            r#"{"action":"save_result","datosPartida":{"posicion_inicial":"(0, 0)","movimientos":63,"completado":true}}"#,
        );
        let Request::SaveResult(result) = Request::try_from(&msg).unwrap() else {
            panic!("expected save_result");
        };
        assert_eq!(result.kind(), GameKind::KnightTour);
    }

    #[test]
    fn spanish_action_key_and_names_are_accepted() {
        let msg = message(r#"{"acción":"solicitar_mejores","juego":"caballo"}"#);
        assert_eq!(msg.action, "solicitar_mejores");
        assert_eq!(
            Request::try_from(&msg).unwrap(),
            Request::RequestBest(GameKind::KnightTour)
        );
    }

    #[test]
    fn invalid_fields_are_validation_errors() {
        let cases = [
            r#"{"action":"save_result","juego":"nreinas","datosPartida":{"N":4,"resuelto":"yes","intentos":4}}"#,
            r#"{"action":"save_result","juego":"nreinas","datosPartida":{"N":4,"resuelto":true}}"#,
            r#"{"action":"save_result","juego":"hanoi","datosPartida":{"discos":3,"movimientos":-1,"completado":true}}"#,
            r#"{"action":"save_result","juego":"hanoi","datosPartida":{"discos":0,"movimientos":0,"completado":false}}"#,
            r#"{"action":"save_result","juego":"ajedrez","datosPartida":{"N":4}}"#,
            r#"{"action":"save_result","datosPartida":{"foo":1}}"#,
            r#"{"action":"save_result","juego":"nreinas"}"#,
            r#"{"action":"save_result","juego":"nreinas","datosPartida":{"N":4,"resuelto":true,"intentos":4},"timestamp":"yesterday"}"#,
            r#"{"action":"request_best","juego":"sudoku"}"#,
            r#"{"action":"request_best"}"#,
            r#"{"action":"launch_rockets"}"#,
        ];

        for raw in cases {
            let err = Request::try_from(&message(raw)).unwrap_err();
            assert_eq!(err.status_code(), 400, "{raw} -> {err}");
        }
    }

    #[test]
    fn unknown_action_message() {
        let err = Request::try_from(&message(r#"{"action":"dance"}"#)).unwrap_err();
        assert_eq!(err.to_string(), "unknown action");
    }

    #[test]
    fn leaderboard_entry_serializes_flat() {
        let entry = LeaderboardEntry {
            id: 3,
            result: GameResult {
                outcome: GameOutcome::NQueens(NQueensResult {
                    n: 4,
                    solved: true,
                    attempts: 4,
                }),
                timestamp: parse_timestamp("2024-05-01T10:00:00Z").unwrap(),
            },
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["N"], 4);
        assert_eq!(value["resuelto"], true);
        assert_eq!(value["intentos"], 4);
        assert!(value["timestamp"].as_str().unwrap().starts_with("2024-05-01T10:00:00"));

        let back = LeaderboardEntry::from_value(GameKind::NQueens, &value).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn error_response_shape() {
        let msg = Response::error(&ArcadeError::validation("unknown action")).into_message();
        assert_eq!(msg.action, ERROR);
        assert_eq!(msg.get("error").unwrap()["code"], 400);
        assert_eq!(msg.get("error").unwrap()["mensaje"], "unknown action");
        assert!(msg.timestamp.as_deref().unwrap().ends_with('Z'));

        match expect_confirmation(msg).unwrap_err() {
            ArcadeError::Remote { code, message } => {
                assert_eq!(code, 400);
                assert_eq!(message, "unknown action");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn save_request_carries_flat_game_fields() {
        let result = GameResult {
            outcome: GameOutcome::KnightTour(KnightTourResult {
                start_square: "(0, 0)".into(),
                moves: 63,
                completed: true,
            }),
            timestamp: parse_timestamp("2024-05-01T10:00:00Z").unwrap(),
        };

        let msg = Request::SaveResult(result.clone()).to_message().unwrap();
        assert_eq!(msg.action, SAVE_RESULT);
        assert_eq!(msg.get("juego"), Some(&json!("caballo")));
        assert_eq!(
            msg.get("datosPartida"),
            Some(&json!({"posicion_inicial": "(0, 0)", "movimientos": 63, "completado": true}))
        );
        assert_eq!(Request::try_from(&msg).unwrap(), Request::SaveResult(result));
    }

    #[test]
    fn best_response_lists_entries() {
        let entry = LeaderboardEntry {
            id: 9,
            result: GameResult {
                outcome: GameOutcome::Hanoi(HanoiResult {
                    disk_count: 3,
                    moves: 7,
                    completed: true,
                }),
                timestamp: parse_timestamp("2024-05-01T10:00:00Z").unwrap(),
            },
        };

        let msg = Response::Best(vec![entry]).into_message();
        assert_eq!(msg.action, CONFIRMATION);
        let list = msg.get("mejores").unwrap().as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["id"], 9);
        assert_eq!(list[0]["discos"], 3);
    }

    #[test]
    fn naive_timestamps_are_read_as_utc() {
        let ts = parse_timestamp("2024-05-01T10:00:00.5").unwrap();
        assert_eq!(format_timestamp(&ts), "2024-05-01T10:00:00.500000Z");
    }
}
