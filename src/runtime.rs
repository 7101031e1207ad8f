//! Single-writer registry service.
//!
//! The registry has no internal locking. When callers live on several
//! threads, a `RegistryService` moves the registry onto one owning thread
//! and runs every command there, in submission order.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Sender, TrySendError};
use tracing::debug;

use crate::error::{ModelError, ModelResult, ServiceError};
use crate::graph::ModelRegistry;

type Command = Box<dyn FnOnce(&mut ModelRegistry) + Send>;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct RegistryServiceConfig {
    /// Maximum queued commands.
    pub command_queue_capacity: usize,
    /// Name of the owning thread.
    pub thread_name: String,
}

impl Default for RegistryServiceConfig {
    fn default() -> Self {
        Self {
            command_queue_capacity: 1024,
            thread_name: "rulegraph-registry".to_string(),
        }
    }
}

/// Owns a [`ModelRegistry`] on a dedicated thread.
#[derive(Debug)]
pub struct RegistryService {
    tx: Option<Sender<Command>>,
    join: Option<JoinHandle<ModelRegistry>>,
    capacity: usize,
}

impl RegistryService {
    /// Moves `registry` onto a new owning thread.
    ///
    /// # Errors
    /// - `SpawnFailed`: the thread could not be started.
    pub fn spawn(mut registry: ModelRegistry, cfg: RegistryServiceConfig) -> ModelResult<Self> {
        let capacity = cfg.command_queue_capacity.max(1);
        let (tx, rx) = bounded::<Command>(capacity);

        let join = thread::Builder::new()
            .name(cfg.thread_name.clone())
            .spawn(move || {
                // Runs until every sender is dropped, draining queued commands.
                while let Ok(command) = rx.recv() {
                    command(&mut registry);
                }
                registry
            })
            .map_err(|e| ServiceError::SpawnFailed {
                reason: e.to_string(),
            })?;

        debug!(thread = %cfg.thread_name, capacity, "registry service started");
        Ok(Self {
            tx: Some(tx),
            join: Some(join),
            capacity,
        })
    }

    /// Runs `f` on the owning thread and waits for its result.
    ///
    /// Blocks while the queue is full.
    ///
    /// # Errors
    /// - `Disconnected`: the owning thread has stopped.
    pub fn execute<R, F>(&self, f: F) -> ModelResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut ModelRegistry) -> R + Send + 'static,
    {
        let (command, reply_rx) = wrap(f);
        self.sender()?
            .send(command)
            .map_err(|_| disconnected("registry_commands"))?;
        reply_rx.recv().map_err(|_| disconnected("registry_reply").into())
    }

    /// Like [`RegistryService::execute`] but fails instead of blocking when
    /// the queue is full.
    ///
    /// # Errors
    /// - `QueueFull`: the queue is at capacity.
    /// - `Disconnected`: the owning thread has stopped.
    pub fn try_execute<R, F>(&self, f: F) -> ModelResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut ModelRegistry) -> R + Send + 'static,
    {
        let (command, reply_rx) = wrap(f);
        match self.sender()?.try_send(command) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                return Err(ServiceError::QueueFull {
                    capacity: self.capacity,
                }
                .into())
            }
            Err(TrySendError::Disconnected(_)) => return Err(disconnected("registry_commands").into()),
        }
        reply_rx.recv().map_err(|_| disconnected("registry_reply").into())
    }

    /// Stops the owning thread after queued commands finish and returns the
    /// registry.
    ///
    /// # Errors
    /// - `Internal`: the owning thread panicked.
    pub fn shutdown(mut self) -> ModelResult<ModelRegistry> {
        drop(self.tx.take());
        let Some(join) = self.join.take() else {
            return Err(ModelError::internal("registry service already stopped"));
        };
        join.join()
            .map_err(|_| ModelError::internal("registry service thread panicked"))
    }

    fn sender(&self) -> Result<&Sender<Command>, ServiceError> {
        self.tx.as_ref().ok_or_else(|| disconnected("registry_commands"))
    }
}

impl Drop for RegistryService {
    fn drop(&mut self) {
        // Close the channel so the worker drains and exits, then join.
        drop(self.tx.take());
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

fn wrap<R, F>(f: F) -> (Command, crossbeam_channel::Receiver<R>)
where
    R: Send + 'static,
    F: FnOnce(&mut ModelRegistry) -> R + Send + 'static,
{
    let (reply_tx, reply_rx) = bounded::<R>(1);
    let command: Command = Box::new(move |registry| {
        let _ = reply_tx.send(f(registry));
    });
    (command, reply_rx)
}

fn disconnected(path: &str) -> ServiceError {
    ServiceError::Disconnected {
        path: path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;
    use crate::path::ModelPath;

    #[test]
    fn test_commands_run_on_owner_and_registry_returns() {
        let service = RegistryService::spawn(ModelRegistry::new(), RegistryServiceConfig::default()).unwrap();

        let name = service
            .execute(|_| thread::current().name().map(str::to_string))
            .unwrap();
        assert_eq!(name.as_deref(), Some("rulegraph-registry"));

        service
            .execute(|registry| registry.register(ModelPath::parse("tasks").unwrap(), None))
            .unwrap()
            .unwrap();

        let registry = service.shutdown().unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_try_execute_reports_full_queue() {
        let cfg = RegistryServiceConfig {
            command_queue_capacity: 1,
            thread_name: "rulegraph-test".to_string(),
        };
        let service = RegistryService::spawn(ModelRegistry::new(), cfg).unwrap();

        // Park the owner thread so the queue can fill up.
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let (started_tx, started_rx) = mpsc::channel::<()>();
        let blocker: Command = Box::new(move |_| {
            let _ = started_tx.send(());
            let _ = release_rx.recv();
        });
        service.sender().unwrap().send(blocker).unwrap();
        started_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let filler: Command = Box::new(|_| {});
        service.sender().unwrap().send(filler).unwrap();

        let err = service.try_execute(|registry| registry.len()).unwrap_err();
        assert!(matches!(err, ModelError::Service(ServiceError::QueueFull { capacity: 1 })));

        release_tx.send(()).unwrap();
        assert_eq!(service.execute(|registry| registry.len()).unwrap(), 0);
    }
}
