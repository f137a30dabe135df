//! Handler dependencies

use std::sync::Arc;

use sierracore::MarketSource;

use crate::config::Settings;
use crate::storage::DbPool;
use crate::telegram::messenger::Messenger;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub db_pool: Arc<DbPool>,
    pub messenger: Arc<dyn Messenger>,
    pub market: Arc<dyn MarketSource>,
    pub settings: Arc<Settings>,
}

impl HandlerDeps {
    pub fn new(
        db_pool: Arc<DbPool>,
        messenger: Arc<dyn Messenger>,
        market: Arc<dyn MarketSource>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            db_pool,
            messenger,
            market,
            settings,
        }
    }
}
