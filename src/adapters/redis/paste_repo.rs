use crate::adapters::redis::RedisClient;
use crate::domain::paste::Paste;
use crate::services::store::{PasteStore, StoreError};
use async_trait::async_trait;
use redis::Script;
use std::sync::{Arc, LazyLock};

/// Each paste is a hash: `paste` holds the JSON document as written at creation, while
/// `expires_at` and `remaining_views` hold the limits as decimal integers. Only
/// `remaining_views` ever changes, and only through `HINCRBY`.
const FIELD_PASTE: &str = "paste";
const FIELD_EXPIRES_AT: &str = "expires_at";
const FIELD_REMAINING_VIEWS: &str = "remaining_views";

/// Creates the hash only if the key is free. ARGV is the flat field/value list.
const INSERT_LUA: &str = r#"
if redis.call("EXISTS", KEYS[1]) == 1 then
  return 0
end
redis.call("HSET", KEYS[1], unpack(ARGV))
return 1
"#;

/// Server-side check-and-decrement for a single paste.
///
/// KEYS[1] is the paste key, ARGV[1] the logical time in milliseconds. Replies with
/// `{"found", json, remaining}`, `{"missing"}` or `{"corrupt", reason}`, where
/// `remaining` is the counter before this view or `""` for an unlimited paste.
/// Lua numbers are doubles, so integers are compared as decimal strings and never
/// converted.
const CONSUME_LUA: &str = r#"
local function compare(a, b)
  local a_neg, b_neg = a:sub(1, 1) == "-", b:sub(1, 1) == "-"
  if a_neg ~= b_neg then
    return a_neg and -1 or 1
  end
  local sign = a_neg and -1 or 1
  if #a ~= #b then
    return (#a < #b and -1 or 1) * sign
  end
  if a == b then
    return 0
  end
  return (a < b and -1 or 1) * sign
end

local function is_integer(value)
  return not value or string.match(value, "^%-?%d+$") ~= nil
end

local kind = redis.call("TYPE", KEYS[1]).ok
if kind == "none" then
  return {"missing"}
end
if kind ~= "hash" then
  return {"corrupt", "unexpected key type " .. kind}
end

local fields = redis.call("HMGET", KEYS[1], "paste", "expires_at", "remaining_views")
local doc, expires_at, remaining = fields[1], fields[2], fields[3]
if not doc then
  return {"corrupt", "missing paste document"}
end
if not is_integer(expires_at) then
  return {"corrupt", "non-integer expires_at"}
end
if not is_integer(remaining) then
  return {"corrupt", "non-integer remaining_views"}
end

if expires_at and compare(ARGV[1], expires_at) > 0 then
  return {"missing"}
end

if not remaining then
  return {"found", doc, ""}
end
if compare(remaining, "0") <= 0 then
  return {"missing"}
end
redis.call("HINCRBY", KEYS[1], "remaining_views", -1)
return {"found", doc, remaining}
"#;

static INSERT_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(INSERT_LUA));
static CONSUME_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(CONSUME_LUA));

#[derive(Debug, Clone)]
pub struct PasteRepository {
    redis: Arc<RedisClient>,
    prefix: String,
}

impl PasteRepository {
    #[must_use]
    pub const fn new(redis: Arc<RedisClient>, prefix: String) -> Self {
        Self { redis, prefix }
    }

    fn key(&self, id: &str) -> String {
        format!("{}{id}", self.prefix)
    }
}

/// Rebuilds the snapshot seen by this view from the stored document and the counter
/// value the script observed before decrementing.
fn found_paste(doc: &str, remaining_before: &str) -> Result<Paste, String> {
    let mut paste: Paste = serde_json::from_str(doc).map_err(|e| e.to_string())?;

    paste.remaining_views = match (paste.max_views, remaining_before) {
        (None, "") => None,
        (Some(_), before) if !before.is_empty() => {
            let before: i64 = before.parse().map_err(|e| format!("remaining_views: {e}"))?;
            Some(before - 1)
        }
        _ => return Err("view limit does not match the stored counter".to_string()),
    };

    Ok(paste)
}

#[async_trait]
impl PasteStore for PasteRepository {
    async fn insert(&self, paste: &Paste) -> Result<bool, StoreError> {
        let payload = serde_json::to_string(paste)?;
        let mut conn = self.redis.connection();

        // No EXPIRE: expiry follows the logical clock, not the Redis clock.
        let mut invocation = INSERT_SCRIPT.key(self.key(&paste.id));
        invocation.arg(FIELD_PASTE).arg(payload);
        if let Some(expires_at) = paste.expires_at {
            invocation.arg(FIELD_EXPIRES_AT).arg(expires_at);
        }
        if let Some(remaining) = paste.remaining_views {
            invocation.arg(FIELD_REMAINING_VIEWS).arg(remaining);
        }

        let inserted: bool = invocation.invoke_async(&mut conn).await?;
        Ok(inserted)
    }

    async fn consume(&self, id: &str, now_ms: i64) -> Result<Option<Paste>, StoreError> {
        let mut conn = self.redis.connection();
        let reply: Vec<String> = CONSUME_SCRIPT.key(self.key(id)).arg(now_ms).invoke_async(&mut conn).await?;

        let corrupt = |reason: String| StoreError::Corrupt { id: id.to_string(), reason };
        match reply.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            ["missing"] => Ok(None),
            ["found", doc, remaining] => found_paste(doc, remaining).map(Some).map_err(corrupt),
            ["corrupt", reason] => Err(corrupt((*reason).to_string())),
            other => Err(corrupt(format!("unexpected script reply: {other:?}"))),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(self.redis.ping().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{"id":"a","content":"x","created_at":0,"expires_at":101760000000000,"max_views":1000000000000000,"remaining_views":1000000000000000}"#;

    #[test]
    fn test_found_paste_takes_remaining_from_counter() {
        let paste = found_paste(DOC, "7").unwrap();
        assert_eq!(paste.remaining_views, Some(6));
        assert_eq!(paste.expires_at, Some(101_760_000_000_000));
        assert_eq!(paste.max_views, Some(1_000_000_000_000_000));
    }

    #[test]
    fn test_found_paste_keeps_large_counters_exact() {
        let paste = found_paste(DOC, &i64::MAX.to_string()).unwrap();
        assert_eq!(paste.remaining_views, Some(i64::MAX - 1));
    }

    #[test]
    fn test_found_paste_unlimited() {
        let paste = found_paste(r#"{"id":"u","content":"x","created_at":5}"#, "").unwrap();
        assert_eq!(paste.remaining_views, None);
        assert_eq!(paste.max_views, None);
    }

    #[test]
    fn test_found_paste_rejects_mismatched_limits() {
        assert!(found_paste(DOC, "").is_err());
        assert!(found_paste(r#"{"id":"u","content":"x","created_at":5}"#, "3").is_err());
        assert!(found_paste(DOC, "3.0").is_err());
        assert!(found_paste("{not json", "").is_err());
    }
}
