//! Telegram Mini App init data validation
//!
//! Telegram signs init data with HMAC-SHA256. The signing key is itself an
//! HMAC: `HMAC_SHA256(key = "WebAppData", message = bot_token)`. The signed
//! message is every field except `hash`, rendered `key=value`, sorted by key
//! and joined with `\n`.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::form_urlencoded;

use crate::core::config::webapp::SIGNING_KEY_LABEL;

type HmacSha256 = Hmac<Sha256>;

const HASH_FIELD: &str = "hash";

/// Why init data was rejected. Only surfaced through `Display` for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RejectReason {
    Malformed,
    MissingHash,
    SignatureMismatch,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RejectReason::Malformed => "malformed init data",
            RejectReason::MissingHash => "missing hash parameter",
            RejectReason::SignatureMismatch => "invalid hash, data may be tampered",
        })
    }
}

/// The init data must not be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("init data rejected: {reason}")]
pub struct Rejected {
    reason: RejectReason,
}

impl From<RejectReason> for Rejected {
    fn from(reason: RejectReason) -> Self {
        Self { reason }
    }
}

/// `user` field of the init data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebAppUser {
    pub id: i64,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_premium: Option<bool>,
}

/// Accepted init data: every decoded field except `hash`, in the order received.
///
/// Values are left as strings. Fields holding JSON (`user`, `receiver`,
/// `chat`) are decoded on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedInitData {
    fields: Vec<(String, String)>,
}

impl ValidatedInitData {
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Unix timestamp the init data was issued at
    pub fn auth_date(&self) -> Option<i64> {
        self.get("auth_date")?.parse().ok()
    }

    /// Decodes the embedded `user` JSON. `None` when the field is absent.
    pub fn user(&self) -> Option<Result<WebAppUser, serde_json::Error>> {
        self.get("user").map(serde_json::from_str)
    }

    /// `true` when `auth_date` is present and no older than `max_age` at `now_unix`.
    ///
    /// Dates slightly in the future (clock skew) count as fresh.
    pub fn is_fresh(&self, max_age: Duration, now_unix: i64) -> bool {
        let Some(auth_date) = self.auth_date() else {
            return false;
        };
        let max_age = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
        now_unix.saturating_sub(auth_date) <= max_age
    }
}

/// Validates Telegram Web App init data.
///
/// # Arguments
/// * `init_data` - Raw query string sent by the Mini App
/// * `bot_token` - Bot token the data was signed for
///
/// # Returns
/// The decoded fields minus `hash` if and only if the signature matches.
///
/// # Example
/// ```
/// use sierracore::webapp_auth::validate_init_data;
///
/// let init_data = "a=1&b=2&hash=5d50b9014db6e1709adb83c26a44b0e55e0fffdfb3e4ea21aae57ce61f2a9fda";
/// let data = validate_init_data(init_data, "S").unwrap();
/// assert_eq!(data.get("a"), Some("1"));
/// assert!(validate_init_data("a=1&b=3&hash=5d50b9014db6e1709adb83c26a44b0e55e0fffdfb3e4ea21aae57ce61f2a9fda", "S").is_err());
/// ```
pub fn validate_init_data(init_data: &str, bot_token: &str) -> Result<ValidatedInitData, Rejected> {
    let mut fields = parse_fields(init_data)?;

    let mut hash_positions = fields
        .iter()
        .enumerate()
        .filter(|(_, (k, _))| k == HASH_FIELD)
        .map(|(i, _)| i);
    let position = hash_positions.next().ok_or(RejectReason::MissingHash)?;
    if hash_positions.next().is_some() {
        return Err(RejectReason::Malformed.into());
    }
    let (_, received_hash) = fields.remove(position);

    // Lower-case hex only, so the byte comparison below equals an exact string comparison
    if !is_lower_hex(&received_hash) {
        return Err(RejectReason::SignatureMismatch.into());
    }
    let received = hex::decode(&received_hash).map_err(|_| RejectReason::SignatureMismatch)?;

    let mut mac = keyed(&secret_key(bot_token));
    mac.update(data_check_string(&fields).as_bytes());
    mac.verify_slice(&received).map_err(|_| RejectReason::SignatureMismatch)?;

    Ok(ValidatedInitData { fields })
}

/// Computes the lower-case hex `hash` for `fields`. Any `hash` field in the input is ignored.
pub fn sign_init_data<K, V>(fields: &[(K, V)], bot_token: &str) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut mac = keyed(&secret_key(bot_token));
    mac.update(data_check_string(&unsigned_fields(fields)).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Encodes `fields` as a query string with a valid trailing `hash`.
pub fn signed_query<K, V>(fields: &[(K, V)], bot_token: &str) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let hash = sign_init_data(fields, bot_token);
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(unsigned_fields(fields))
        .append_pair(HASH_FIELD, &hash)
        .finish()
}

fn unsigned_fields<K, V>(fields: &[(K, V)]) -> Vec<(String, String)>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fields
        .iter()
        .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
        .filter(|(k, _)| k != HASH_FIELD)
        .collect()
}

fn parse_fields(init_data: &str) -> Result<Vec<(String, String)>, RejectReason> {
    if init_data.is_empty() {
        return Err(RejectReason::Malformed);
    }

    let fields: Vec<(String, String)> = form_urlencoded::parse(init_data.as_bytes()).into_owned().collect();
    if fields.is_empty() || fields.iter().any(|(k, _)| k.is_empty()) {
        return Err(RejectReason::Malformed);
    }

    Ok(fields)
}

/// `key=value` lines sorted by key. The sort is stable so repeated keys keep their order.
fn data_check_string(fields: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = fields.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    sorted
        .iter()
        .map(|pair| format!("{}={}", pair.0, pair.1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `HMAC_SHA256(key = "WebAppData", message = bot_token)`, used raw as the next key.
fn secret_key(bot_token: &str) -> Vec<u8> {
    let mut mac = keyed(SIGNING_KEY_LABEL);
    mac.update(bot_token.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

#[allow(clippy::expect_used)]
fn keyed(key: &[u8]) -> HmacSha256 {
    HmacSha256::new_from_slice(key).expect("HMAC can take key of any size")
}

fn is_lower_hex(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
