//! Tagged-variant dispatch event payloads, replacing the legacy open
//! `cargo`-bag-plus-callable scheme per the §9 design note: "encode the
//! expected argument shape in the type."

use std::sync::Arc;

use crate::foundation::EventKind;

#[derive(Debug, Clone)]
pub enum DispatchEvent {
    Start { task_id: String },
    Progress { task_id: String, percentage: f64, message: String },
    Finish { task_id: String, result: String },
    Error { task_id: String, message: String },
    Abort { task_id: String, message: String },
}

impl DispatchEvent {
    pub fn task_id(&self) -> &str {
        match self {
            DispatchEvent::Start { task_id }
            | DispatchEvent::Progress { task_id, .. }
            | DispatchEvent::Finish { task_id, .. }
            | DispatchEvent::Error { task_id, .. }
            | DispatchEvent::Abort { task_id, .. } => task_id,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            DispatchEvent::Start { .. } => EventKind::Start,
            DispatchEvent::Progress { .. } => EventKind::Progress,
            DispatchEvent::Finish { .. } => EventKind::Finish,
            DispatchEvent::Error { .. } => EventKind::Error,
            DispatchEvent::Abort { .. } => EventKind::Abort,
        }
    }
}

/// One hook: `{dispatch_name, operation_label, event, handler}` per §4.2.
#[derive(Clone)]
pub struct DispatchMethod {
    pub dispatch_name: String,
    pub operation_label: String,
    pub event: EventKind,
    pub handler: Arc<dyn Fn(DispatchEvent) + Send + Sync>,
}

impl DispatchMethod {
    pub fn new(
        dispatch_name: impl Into<String>,
        operation_label: impl Into<String>,
        event: EventKind,
        handler: impl Fn(DispatchEvent) + Send + Sync + 'static,
    ) -> Self {
        Self {
            dispatch_name: dispatch_name.into(),
            operation_label: operation_label.into(),
            event,
            handler: Arc::new(handler),
        }
    }
}

impl std::fmt::Debug for DispatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchMethod")
            .field("dispatch_name", &self.dispatch_name)
            .field("operation_label", &self.operation_label)
            .field("event", &self.event)
            .finish_non_exhaustive()
    }
}
