//! State

use std::sync::Arc;

use jiff::Timestamp;
use soko_app::context::AppContext;

/// Shared by every request through the depot.
#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,
    pub(crate) started_at: Timestamp,
}

impl State {
    #[must_use]
    pub(crate) fn from_app_context(app: AppContext) -> Arc<Self> {
        Arc::new(Self {
            app,
            started_at: Timestamp::now(),
        })
    }
}
