//! Common test utilities
//!
//! Shared by the handler and router integration tests: a messenger that
//! records instead of calling Telegram, a canned market source and a
//! throwaway SQLite database.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sierrabravo::config::Settings;
use sierrabravo::storage::{create_pool, DbPool};
use sierrabravo::telegram::{ChatTarget, HandlerDeps, Messenger, Update, WebAppButton};
use sierrabravo::{AppError, AppResult};
use sierracore::{MarketError, MarketSource, MarketSummary, Quote};
use tempfile::TempDir;

pub const TEST_TOKEN: &str = "123456:TEST-token";
pub const ADMIN_CHAT_ID: i64 = 777;
pub const WEBAPP_URL: &str = "https://app.example.com/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Message {
        target: ChatTarget,
        text: String,
        button: Option<WebAppButton>,
    },
    Edit {
        chat_id: i64,
        message_id: i32,
        text: String,
    },
}

/// Records every call. Message ids start at 100.
#[derive(Default)]
pub struct RecordingMessenger {
    calls: Mutex<Vec<Sent>>,
    next_id: AtomicI32,
    fail_edits: bool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `edit_text` fails with a Telegram-side error.
    pub fn failing_edits() -> Self {
        Self {
            fail_edits: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Sent> {
        self.calls.lock().unwrap().clone()
    }

    pub fn messages_to(&self, chat_id: i64) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Sent::Message { target, text, .. } if target.chat_id == chat_id => Some(text),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, target: ChatTarget, text: &str, button: Option<&WebAppButton>) -> AppResult<i32> {
        self.calls.lock().unwrap().push(Sent::Message {
            target,
            text: text.to_string(),
            button: button.cloned(),
        });
        Ok(100 + self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn edit_text(&self, chat_id: i64, message_id: i32, text: &str) -> AppResult<()> {
        self.calls.lock().unwrap().push(Sent::Edit {
            chat_id,
            message_id,
            text: text.to_string(),
        });
        if self.fail_edits {
            return Err(AppError::Telegram(teloxide::RequestError::Api(
                teloxide::ApiError::MessageNotModified,
            )));
        }
        Ok(())
    }
}

/// Market source with a fixed answer
pub struct FakeMarket {
    summary: Option<MarketSummary>,
}

impl FakeMarket {
    pub fn ok() -> Self {
        Self {
            summary: Some(sample_summary()),
        }
    }

    pub fn layout_changed() -> Self {
        Self { summary: None }
    }
}

#[async_trait]
impl MarketSource for FakeMarket {
    async fn market_summary(&self) -> Result<MarketSummary, MarketError> {
        self.summary.clone().ok_or(MarketError::LayoutChanged { row: "gold" })
    }
}

pub fn sample_summary() -> MarketSummary {
    MarketSummary {
        gold: Quote {
            price: "45,120,000".to_string(),
            change: "+0.4%".to_string(),
        },
        tether: Quote {
            price: "93,800".to_string(),
            change: "-120".to_string(),
        },
    }
}

/// Temp database and static directory plus the handler dependencies around them
pub struct TestEnvironment {
    pub dir: TempDir,
    pub db_pool: Arc<DbPool>,
    pub messenger: Arc<RecordingMessenger>,
    pub deps: HandlerDeps,
}

impl TestEnvironment {
    pub fn new(market: FakeMarket) -> Self {
        Self::build(market, RecordingMessenger::new(), &[])
    }

    /// `extra` overrides or adds environment variables.
    pub fn build(market: FakeMarket, messenger: RecordingMessenger, extra: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.sqlite");
        let static_dir = dir.path().join("static");
        std::fs::create_dir_all(&static_dir).unwrap();
        std::fs::write(static_dir.join("index.html"), "<html>SierraBravo</html>").unwrap();

        let admin = ADMIN_CHAT_ID.to_string();
        let mut vars: HashMap<String, String> = [
            ("BOT_TOKEN", TEST_TOKEN),
            ("ADMIN_CHAT_ID", admin.as_str()),
            ("WEBAPP_URL", WEBAPP_URL),
            ("DATABASE_PATH", db_path.to_str().unwrap()),
            ("STATIC_DIR", static_dir.to_str().unwrap()),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (k, v) in extra {
            vars.insert(k.to_string(), v.to_string());
        }

        let settings = Settings::from_lookup(|name| vars.get(name).cloned()).unwrap();
        let db_pool = Arc::new(create_pool(&settings.database_path).unwrap());
        let messenger = Arc::new(messenger);

        let deps = HandlerDeps::new(
            Arc::clone(&db_pool),
            messenger.clone(),
            Arc::new(market),
            Arc::new(settings),
        );

        Self {
            dir,
            db_pool,
            messenger,
            deps,
        }
    }
}

/// Telegram update JSON for a text message
pub fn message_update(chat_id: i64, thread_id: Option<i32>, text: &str) -> serde_json::Value {
    let mut message = serde_json::json!({
        "message_id": 1,
        "date": 1_700_000_000,
        "chat": {"id": chat_id, "type": "private"},
        "from": {"id": chat_id, "is_bot": false, "first_name": "Sara"},
        "text": text,
    });
    if let Some(thread_id) = thread_id {
        message["message_thread_id"] = serde_json::json!(thread_id);
    }
    serde_json::json!({"update_id": 1, "message": message})
}

pub fn parse_update(json: serde_json::Value) -> Update {
    serde_json::from_value(json).unwrap()
}
