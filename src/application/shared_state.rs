//! Process-wide state shared by all command handlers
//!
//! Owns the loaded configuration, the workflow wired to the real
//! collaborators, and one `WidgetController` per open widget instance
//! (keyed by page and viewer). At most `widget.max_open_instances`
//! controllers are kept; the least recently used one is dropped to make room.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use crate::application::dto::HostContext;
use crate::application::state::WidgetController;
use crate::application::validation_workflow::ValidationWorkflow;
use crate::infrastructure::config::AppConfig;

struct InstanceSlot {
    controller: Arc<WidgetController>,
    last_used: AtomicU64,
}

pub struct SharedState {
    config: AppConfig,
    workflow: ValidationWorkflow,
    controllers: RwLock<HashMap<HostContext, InstanceSlot>>,
    max_instances: usize,
    clock: AtomicU64,
}

impl SharedState {
    pub fn new(config: AppConfig, workflow: ValidationWorkflow) -> Self {
        let max_instances = config.widget.max_open_instances.max(1);
        Self {
            config,
            workflow,
            controllers: RwLock::new(HashMap::new()),
            max_instances,
            clock: AtomicU64::new(0),
        }
    }

    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    pub const fn workflow(&self) -> &ValidationWorkflow {
        &self.workflow
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Controller for this widget instance, created on first use.
    pub async fn controller(&self, context: &HostContext) -> Arc<WidgetController> {
        if let Some(slot) = self.controllers.read().await.get(context) {
            slot.last_used.store(self.tick(), Ordering::Relaxed);
            return Arc::clone(&slot.controller);
        }

        let mut controllers = self.controllers.write().await;
        if let Some(slot) = controllers.get(context) {
            slot.last_used.store(self.tick(), Ordering::Relaxed);
            return Arc::clone(&slot.controller);
        }

        if controllers.len() >= self.max_instances {
            let oldest = controllers
                .iter()
                .min_by_key(|(_, slot)| slot.last_used.load(Ordering::Relaxed))
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                debug!("Evicting idle widget instance for page {}", oldest.content_id);
                controllers.remove(&oldest);
            }
        }

        debug!("Opening widget instance for page {}", context.content_id);
        let controller = Arc::new(WidgetController::new(context.clone(), self.workflow.clone()));
        controllers.insert(
            context.clone(),
            InstanceSlot {
                controller: Arc::clone(&controller),
                last_used: AtomicU64::new(self.tick()),
            },
        );
        controller
    }

    /// Drops the controller of a closed widget. Returns whether one existed.
    pub async fn release(&self, context: &HostContext) -> bool {
        self.controllers.write().await.remove(context).is_some()
    }

    pub async fn instance_count(&self) -> usize {
        self.controllers.read().await.len()
    }
}
