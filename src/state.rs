use std::sync::Arc;

use crate::services::llm_service::NarrativeGenerator;
use crate::services::news_service::NewsService;
use crate::store::sessions::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub news_service: Arc<NewsService>,
    pub llm_service: Arc<dyn NarrativeGenerator>,
}
