use std::sync::Arc;

use tokio::sync::RwLock;

use crate::ai::AiClient;
use crate::editor::EditorSession;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The single owned store handle; all persistence flows through it.
    pub store: Store,
    pub ai: Arc<dyn AiClient>,
    /// The one editor session of this single-user workbench.
    /// `None` means the catalog (list) view; `Some` means a resume is open.
    /// Overlapping writers are last-writer-wins, matching the serial event
    /// model of the UI this serves.
    pub session: Arc<RwLock<Option<EditorSession>>>,
}
