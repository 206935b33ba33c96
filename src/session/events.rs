use tokio::sync::broadcast;

/// Session lifecycle notifications for interested collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Sign-in, sign-up or a successful identity probe populated the session
    Established { tenant_id: Option<String> },
    /// An authentication failure tore the session down
    Invalidated,
    /// Local sign-out completed
    SignedOut,
}

#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: SessionEvent) {
        tracing::debug!("Session event: {:?}", event);
        // No receivers is fine
        let _ = self.tx.send(event);
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
