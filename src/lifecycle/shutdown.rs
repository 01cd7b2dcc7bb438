//! In-process stop requests for a running server.
//!
//! `HttpServer::run` accepts any future as its stop condition. The binary
//! passes OS termination; embedders and tests pair a [`ShutdownTrigger`] with
//! the future returned by [`shutdown_channel`].

use std::future::Future;

use tokio::sync::oneshot;

/// Requests a graceful stop of the server it was paired with.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: oneshot::Sender<()>,
}

impl ShutdownTrigger {
    /// Ask the server to stop accepting connections and drain.
    pub fn trigger(self) {
        let _ = self.tx.send(());
    }
}

/// Create a trigger and the stop future it resolves.
///
/// Dropping the trigger without firing it leaves the server running.
pub fn shutdown_channel() -> (ShutdownTrigger, impl Future<Output = ()> + Send + 'static) {
    let (tx, rx) = oneshot::channel();
    let signal = async move {
        if rx.await.is_ok() {
            tracing::info!("Shutdown requested");
        } else {
            std::future::pending::<()>().await;
        }
    };
    (ShutdownTrigger { tx }, signal)
}
