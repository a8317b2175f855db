use std::sync::Arc;
use crate::config::Config;
use crate::service::Microblog;

#[derive(Clone)]
pub struct AppState {
    pub service: Microblog,
    pub config: Arc<Config>,
}
