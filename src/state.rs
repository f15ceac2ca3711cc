use std::sync::Arc;

use crate::automation::Automation;
use crate::config::Config;
use crate::ui::Pages;

/// Read-only state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pages: Arc<Pages>,
    pub automation: Arc<Automation>,
}

impl AppState {
    pub fn new(config: Config, pages: Pages) -> Self {
        let automation = Automation::from_config(&config);
        Self {
            config: Arc::new(config),
            pages: Arc::new(pages),
            automation: Arc::new(automation),
        }
    }
}
