use tokio::sync::watch;

/// Create a shutdown pair; dropping or triggering the sender stops every
/// task holding the handle.
pub fn shutdown_channel() -> (watch::Sender<bool>, ShutdownHandle) {
    let (tx, rx) = watch::channel(false);
    (tx, ShutdownHandle { receiver: rx })
}

/// Cloneable receiver side of the shutdown signal, one per background task.
#[derive(Clone)]
pub struct ShutdownHandle {
    receiver: watch::Receiver<bool>,
}

impl ShutdownHandle {
    pub fn is_shutdown(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolve once shutdown is triggered or the sender is dropped.
    pub async fn wait(&mut self) {
        while !*self.receiver.borrow() {
            if self.receiver.changed().await.is_err() {
                break;
            }
        }
    }
}
