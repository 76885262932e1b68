//! Dynconfig Store
//!
//! Owns the in-memory last-known-good payload, the cache file and the
//! background refresh loop for one node role.
//!
//! Lifecycle: `Created -> Serving -> Stopped`. `stop` is terminal and
//! idempotent.

use super::cache::CacheFile;
use super::error::{Error, Result};
use super::observer::{Observer, ObserverRegistry};
use crate::config::DynconfigConfig;
use crate::observability::{events, metrics};
use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tokio::sync::{oneshot, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Remote source of a dynconfig payload, usually the manager.
#[async_trait]
pub trait DynconfigSource<T>: Send + Sync {
    async fn fetch(&self) -> Result<T>;
}

/// Payload types that can live in a [`Dynconfig`] store
pub trait DynconfigData: Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> DynconfigData for T where T: Serialize + DeserializeOwned + Send + Sync + 'static {}

/// Store lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DynconfigState {
    /// Constructed, background refresh not started
    Created,
    /// Background refresh loop running
    Serving,
    /// Stopped; terminal
    Stopped,
}

const CREATED: u8 = 0;
const SERVING: u8 = 1;
const STOPPED: u8 = 2;

impl From<u8> for DynconfigState {
    fn from(value: u8) -> Self {
        match value {
            CREATED => DynconfigState::Created,
            SERVING => DynconfigState::Serving,
            _ => DynconfigState::Stopped,
        }
    }
}

struct RefreshWorker {
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Dynamic configuration store, generic over the role's payload type.
pub struct Dynconfig<T> {
    source: Option<Arc<dyn DynconfigSource<T>>>,
    cache: CacheFile,
    config: DynconfigConfig,
    data: RwLock<Option<Arc<T>>>,
    observers: ObserverRegistry<T>,
    /// Serializes refreshes, fan-outs and cache removal
    refresh_lock: Mutex<()>,
    state: AtomicU8,
    worker: Mutex<Option<RefreshWorker>>,
}

impl<T: DynconfigData> Dynconfig<T> {
    /// Create a store and seed it from the cache file or the source.
    ///
    /// A cache younger than `expire_time` seeds the store without calling the
    /// source. Otherwise the source is fetched; if that fails an expired cache
    /// is still used. With no source the store runs standalone: nothing is
    /// fetched, cached or refreshed.
    pub async fn new(
        source: Option<Arc<dyn DynconfigSource<T>>>,
        file_name: &str,
        config: DynconfigConfig,
    ) -> Result<Self> {
        let dynconfig = Self::build(source, file_name, config, None);

        match &dynconfig.source {
            Some(source) => dynconfig.load_or_fetch(source.as_ref()).await?,
            None => debug!(file_name = %file_name, "No manager source, dynconfig runs standalone"),
        }

        Ok(dynconfig)
    }

    /// Standalone store holding a fixed payload.
    pub fn with_data(data: T, file_name: &str, config: DynconfigConfig) -> Self {
        Self::build(None, file_name, config, Some(Arc::new(data)))
    }

    /// Standalone store with no payload; `get` fails with `MissingConfig`.
    pub fn standalone(file_name: &str, config: DynconfigConfig) -> Self {
        Self::build(None, file_name, config, None)
    }

    fn build(
        source: Option<Arc<dyn DynconfigSource<T>>>,
        file_name: &str,
        mut config: DynconfigConfig,
        data: Option<Arc<T>>,
    ) -> Self {
        if config.refresh_interval.is_zero() {
            let fallback = DynconfigConfig::default().refresh_interval;
            warn!(
                file_name = %file_name,
                refresh_interval = ?fallback,
                "Zero dynconfig refresh interval, using default"
            );
            config.refresh_interval = fallback;
        }

        Self {
            source,
            cache: CacheFile::new(&config.cache_dir, file_name),
            config,
            data: RwLock::new(data),
            observers: ObserverRegistry::new(),
            refresh_lock: Mutex::new(()),
            state: AtomicU8::new(CREATED),
            worker: Mutex::new(None),
        }
    }

    async fn load_or_fetch(&self, source: &dyn DynconfigSource<T>) -> Result<()> {
        let cached = match self.cache.load::<T>().await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(
                    path = %self.cache.path().display(),
                    error = %e,
                    "Ignoring unreadable dynconfig cache"
                );
                None
            }
        };

        let cached = match cached {
            Some(entry) if !entry.is_expired(self.config.expire_time) => {
                events::dynconfig_cache_loaded(
                    &self.cache.path().display().to_string(),
                    entry.age().unwrap_or_default().as_secs(),
                );
                *self.data.write().await = Some(Arc::new(entry.data));
                return Ok(());
            }
            other => other,
        };

        let fetched = match self.fetch(source).await {
            Ok(data) => self.update(data).await,
            Err(e) => Err(e),
        };

        match (fetched, cached) {
            (Ok(_), _) => Ok(()),
            (Err(e), Some(entry)) => {
                warn!(
                    path = %self.cache.path().display(),
                    error = %e,
                    "Manager unavailable, using expired dynconfig cache"
                );
                *self.data.write().await = Some(Arc::new(entry.data));
                Ok(())
            }
            (Err(e), None) => Err(e),
        }
    }

    async fn fetch(&self, source: &dyn DynconfigSource<T>) -> Result<T> {
        match tokio::time::timeout(self.config.fetch_timeout, source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(Error::FetchTimeout(self.config.fetch_timeout)),
        }
    }

    /// Persist then publish a new payload. The in-memory payload only changes
    /// once the cache file holds the same data.
    async fn update(&self, data: T) -> Result<Arc<T>> {
        self.cache.store(Utc::now(), &data).await?;
        let data = Arc::new(data);
        *self.data.write().await = Some(Arc::clone(&data));
        Ok(data)
    }

    /// Current payload. Never calls the source.
    pub async fn get(&self) -> Result<Arc<T>> {
        self.data
            .read()
            .await
            .clone()
            .ok_or(Error::MissingConfig("dynconfig data"))
    }

    /// Fetch from the source, replace the payload and cache file, and notify
    /// observers. On failure the previous payload and cache stay in place.
    pub async fn refresh(&self) -> Result<()> {
        let Some(source) = &self.source else {
            return Ok(());
        };

        let _guard = self.refresh_lock.lock().await;
        if self.state() == DynconfigState::Stopped {
            return Err(Error::Stopped);
        }

        let started = Instant::now();
        let result = match self.fetch(source.as_ref()).await {
            Ok(data) => self.update(data).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(data) => {
                metrics::record_refresh("success", started.elapsed());
                let notified = self.observers.notify_all(&data).await;
                metrics::record_notify(notified);
                events::dynconfig_refreshed(
                    &self.cache.path().display().to_string(),
                    notified,
                    started.elapsed(),
                );
                Ok(())
            }
            Err(e) => {
                metrics::record_refresh("failure", started.elapsed());
                Err(e)
            }
        }
    }

    /// Register an observer for refresh notifications.
    pub async fn register<O>(&self, observer: &Arc<O>)
    where
        O: Observer<T> + 'static,
    {
        self.observers.register(observer).await;
    }

    /// Deregister an observer. Unknown observers are ignored.
    pub async fn deregister<O>(&self, observer: &Arc<O>)
    where
        O: Observer<T> + 'static,
    {
        self.observers.deregister(observer).await;
    }

    /// Push the current payload to every observer.
    ///
    /// If no payload is available the error is returned and nobody is
    /// notified.
    pub async fn notify(&self) -> Result<()> {
        let _guard = self.refresh_lock.lock().await;
        let data = self.get().await?;
        let notified = self.observers.notify_all(&data).await;
        metrics::record_notify(notified);
        Ok(())
    }

    /// Notify observers once, then refresh every `refresh_interval` in the
    /// background until [`stop`](Self::stop).
    ///
    /// The initial notification error is returned and leaves the store in
    /// `Created`. Background refresh failures are only logged.
    pub async fn serve(self: &Arc<Self>) -> Result<()> {
        match self
            .state
            .compare_exchange(CREATED, SERVING, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {}
            Err(SERVING) => return Err(Error::AlreadyServing),
            Err(_) => return Err(Error::Stopped),
        }

        // A standalone store without a payload has nothing to push
        let standalone = self.source.is_none();
        if !standalone || self.data.read().await.is_some() {
            if let Err(e) = self.notify().await {
                let _ = self
                    .state
                    .compare_exchange(SERVING, CREATED, Ordering::AcqRel, Ordering::Acquire);
                return Err(e);
            }
        }

        if standalone {
            debug!("Standalone dynconfig, background refresh disabled");
            return Ok(());
        }

        let mut worker = self.worker.lock().await;
        if self.state() == DynconfigState::Stopped {
            return Err(Error::Stopped);
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(refresh_loop(
            Arc::downgrade(self),
            self.config.refresh_interval,
            shutdown_rx,
        ));
        *worker = Some(RefreshWorker {
            shutdown_tx,
            handle,
        });

        info!(
            path = %self.cache.path().display(),
            refresh_interval = ?self.config.refresh_interval,
            "Dynconfig serving"
        );
        Ok(())
    }

    /// Stop the background loop and delete the cache file.
    ///
    /// Waits for an in-flight refresh to finish. Calling `stop` again is a
    /// no-op. Must not be called from inside `on_notify`.
    pub async fn stop(&self) -> Result<()> {
        if self.state.swap(STOPPED, Ordering::AcqRel) == STOPPED {
            return Ok(());
        }

        let worker = self.worker.lock().await.take();
        if let Some(worker) = worker {
            let _ = worker.shutdown_tx.send(());
            if let Err(e) = worker.handle.await {
                warn!(error = %e, "Dynconfig refresh loop ended abnormally");
            }
        }

        if self.source.is_none() {
            return Ok(());
        }

        let _guard = self.refresh_lock.lock().await;
        self.cache.remove().await?;
        info!(path = %self.cache.path().display(), "Dynconfig stopped, cache removed");
        Ok(())
    }

    pub fn state(&self) -> DynconfigState {
        self.state.load(Ordering::Acquire).into()
    }

    pub fn cache_path(&self) -> &Path {
        self.cache.path()
    }

    pub fn config(&self) -> &DynconfigConfig {
        &self.config
    }

    pub async fn observer_count(&self) -> usize {
        self.observers.len().await
    }
}

/// Background refresh loop. Wakes only on the ticker and the stop signal.
async fn refresh_loop<T: DynconfigData>(
    dynconfig: Weak<Dynconfig<T>>,
    interval: Duration,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await; // Skip first immediate tick

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown_rx => {
                debug!("Dynconfig refresh loop received stop signal");
                return;
            }

            _ = ticker.tick() => {
                let Some(dynconfig) = dynconfig.upgrade() else {
                    debug!("Dynconfig dropped, refresh loop exiting");
                    return;
                };

                match dynconfig.refresh().await {
                    Ok(()) => {}
                    Err(Error::Stopped) => return,
                    Err(e) => events::dynconfig_refresh_failed(
                        &dynconfig.cache_path().display().to_string(),
                        &e.to_string(),
                    ),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicBool, AtomicUsize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Topology {
        version: u32,
        peers: Vec<String>,
    }

    fn topology(version: u32) -> Topology {
        Topology {
            version,
            peers: vec![format!("10.0.0.{version}")],
        }
    }

    /// Source returning an incrementing version, or an error while `failing`
    #[derive(Default)]
    struct FakeSource {
        version: AtomicUsize,
        failing: AtomicBool,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn failing() -> Self {
            let source = Self::default();
            source.failing.store(true, Ordering::SeqCst);
            source
        }

        fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl DynconfigSource<Topology> for FakeSource {
        async fn fetch(&self) -> Result<Topology> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(Error::Fetch(tonic::Status::unavailable("manager down")));
            }
            let version = self.version.fetch_add(1, Ordering::SeqCst) as u32 + 1;
            Ok(topology(version))
        }
    }

    #[derive(Default)]
    struct Recorder {
        seen: std::sync::Mutex<Vec<u32>>,
    }

    impl Recorder {
        fn seen(&self) -> Vec<u32> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Observer<Topology> for Recorder {
        fn on_notify(&self, data: &Topology) {
            self.seen.lock().unwrap().push(data.version);
        }
    }

    fn test_config(dir: &Path) -> DynconfigConfig {
        DynconfigConfig {
            cache_dir: dir.to_path_buf(),
            refresh_interval: Duration::from_millis(20),
            expire_time: Duration::from_secs(60),
            fetch_timeout: Duration::from_secs(1),
            ..Default::default()
        }
    }

    async fn new_store(
        source: &Arc<FakeSource>,
        config: DynconfigConfig,
    ) -> Result<Dynconfig<Topology>> {
        let source: Arc<dyn DynconfigSource<Topology>> = source.clone();
        Dynconfig::new(Some(source), "scheduler", config).await
    }

    #[tokio::test]
    async fn test_new_fetches_and_writes_cache() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default());
        let dynconfig = new_store(&source, test_config(dir.path())).await.unwrap();

        assert_eq!(*dynconfig.get().await.unwrap(), topology(1));
        assert!(dir.path().join("scheduler").exists());
        assert_eq!(dynconfig.state(), DynconfigState::Created);
    }

    #[tokio::test]
    async fn test_new_without_cache_or_manager_fails() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::failing());
        let result = new_store(&source, test_config(dir.path())).await;
        assert!(matches!(result, Err(Error::Fetch(_))));
    }

    #[tokio::test]
    async fn test_restart_within_expiry_uses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default());
        let first = new_store(&source, test_config(dir.path())).await.unwrap();
        first.refresh().await.unwrap();
        let persisted = first.get().await.unwrap();
        drop(first);

        let unreachable = Arc::new(FakeSource::failing());
        let restarted = new_store(&unreachable, test_config(dir.path()))
            .await
            .unwrap();

        assert_eq!(restarted.get().await.unwrap(), persisted);
        assert_eq!(unreachable.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_restart_with_expired_cache_refetches() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default());
        let mut config = test_config(dir.path());
        config.expire_time = Duration::ZERO;
        drop(new_store(&source, config.clone()).await.unwrap());

        let restarted = new_store(&source, config).await.unwrap();
        assert_eq!(restarted.get().await.unwrap().version, 2);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expired_cache_used_when_manager_down() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default());
        let mut config = test_config(dir.path());
        config.expire_time = Duration::ZERO;
        drop(new_store(&source, config.clone()).await.unwrap());

        let unreachable = Arc::new(FakeSource::failing());
        let restarted = new_store(&unreachable, config).await.unwrap();
        assert_eq!(*restarted.get().await.unwrap(), topology(1));
        assert_eq!(unreachable.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_preserves_state() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default());
        let dynconfig = new_store(&source, test_config(dir.path())).await.unwrap();
        let before = dynconfig.get().await.unwrap();
        let cached_before = std::fs::read(dynconfig.cache_path()).unwrap();

        source.set_failing(true);
        assert!(dynconfig.refresh().await.is_err());

        assert_eq!(dynconfig.get().await.unwrap(), before);
        assert_eq!(std::fs::read(dynconfig.cache_path()).unwrap(), cached_before);
    }

    #[tokio::test]
    async fn test_refresh_fan_out_atomicity() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default());
        let dynconfig = new_store(&source, test_config(dir.path())).await.unwrap();
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        dynconfig.register(&first).await;
        dynconfig.register(&second).await;

        source.set_failing(true);
        assert!(dynconfig.refresh().await.is_err());
        assert!(first.seen().is_empty());
        assert!(second.seen().is_empty());

        source.set_failing(false);
        dynconfig.refresh().await.unwrap();
        assert_eq!(first.seen(), vec![2]);
        assert_eq!(second.seen(), vec![2]);
    }

    #[tokio::test]
    async fn test_standalone_store() {
        let dir = tempfile::tempdir().unwrap();
        let dynconfig = Arc::new(
            Dynconfig::<Topology>::new(None, "scheduler", test_config(dir.path()))
                .await
                .unwrap(),
        );
        let recorder = Arc::new(Recorder::default());
        dynconfig.register(&recorder).await;

        assert!(matches!(dynconfig.get().await, Err(Error::MissingConfig(_))));
        assert!(matches!(dynconfig.notify().await, Err(Error::MissingConfig(_))));
        dynconfig.refresh().await.unwrap();
        dynconfig.serve().await.unwrap();
        dynconfig.stop().await.unwrap();

        assert!(recorder.seen().is_empty());
        assert!(!dir.path().join("scheduler").exists());
    }

    #[tokio::test]
    async fn test_with_data_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let dynconfig = Dynconfig::with_data(topology(5), "scheduler", test_config(dir.path()));
        let recorder = Arc::new(Recorder::default());
        dynconfig.register(&recorder).await;

        dynconfig.notify().await.unwrap();
        assert_eq!(recorder.seen(), vec![5]);
    }

    #[tokio::test]
    async fn test_serve_pushes_fixed_payload() {
        let dir = tempfile::tempdir().unwrap();
        let dynconfig = Arc::new(Dynconfig::with_data(
            topology(5),
            "scheduler",
            test_config(dir.path()),
        ));
        let recorder = Arc::new(Recorder::default());
        dynconfig.register(&recorder).await;

        dynconfig.serve().await.unwrap();
        assert_eq!(recorder.seen(), vec![5]);
        assert_eq!(dynconfig.state(), DynconfigState::Serving);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(recorder.seen(), vec![5]);
        dynconfig.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_zero_refresh_interval_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default());
        let mut config = test_config(dir.path());
        config.refresh_interval = Duration::ZERO;

        let dynconfig = Arc::new(new_store(&source, config).await.unwrap());
        assert_eq!(
            dynconfig.config().refresh_interval,
            DynconfigConfig::default().refresh_interval
        );

        dynconfig.serve().await.unwrap();
        assert_eq!(dynconfig.state(), DynconfigState::Serving);
        dynconfig.stop().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_serve_notifies_then_refreshes() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default());
        let dynconfig = Arc::new(new_store(&source, test_config(dir.path())).await.unwrap());
        let recorder = Arc::new(Recorder::default());
        dynconfig.register(&recorder).await;

        dynconfig.serve().await.unwrap();
        assert_eq!(recorder.seen(), vec![1]);
        assert_eq!(dynconfig.state(), DynconfigState::Serving);

        tokio::time::sleep(Duration::from_millis(120)).await;
        let seen = recorder.seen();
        assert!(seen.len() >= 2, "expected background refreshes, saw {seen:?}");
        assert!(seen.windows(2).all(|w| w[0] < w[1]));

        dynconfig.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_serve_twice_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default());
        let dynconfig = Arc::new(new_store(&source, test_config(dir.path())).await.unwrap());

        dynconfig.serve().await.unwrap();
        assert!(matches!(dynconfig.serve().await, Err(Error::AlreadyServing)));

        dynconfig.stop().await.unwrap();
        assert!(matches!(dynconfig.serve().await, Err(Error::Stopped)));
    }

    #[tokio::test]
    async fn test_background_failures_do_not_stop_loop() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default());
        let dynconfig = Arc::new(new_store(&source, test_config(dir.path())).await.unwrap());
        let recorder = Arc::new(Recorder::default());
        dynconfig.register(&recorder).await;
        dynconfig.serve().await.unwrap();

        source.set_failing(true);
        tokio::time::sleep(Duration::from_millis(80)).await;
        let during_outage = recorder.seen().len();
        let last_version = source.version.load(Ordering::SeqCst) as u32;
        assert_eq!(*dynconfig.get().await.unwrap(), topology(last_version));

        source.set_failing(false);
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(recorder.seen().len() > during_outage);

        dynconfig.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_removes_cache_and_halts_notifications() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default());
        let dynconfig = Arc::new(new_store(&source, test_config(dir.path())).await.unwrap());
        let recorder = Arc::new(Recorder::default());
        dynconfig.register(&recorder).await;
        dynconfig.serve().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        dynconfig.stop().await.unwrap();
        assert!(!dynconfig.cache_path().exists());
        assert_eq!(dynconfig.state(), DynconfigState::Stopped);

        let after_stop = recorder.seen().len();
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(recorder.seen().len(), after_stop);
        assert!(!dynconfig.cache_path().exists());
        assert!(matches!(dynconfig.refresh().await, Err(Error::Stopped)));
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(FakeSource::default());
        let dynconfig = Arc::new(new_store(&source, test_config(dir.path())).await.unwrap());
        dynconfig.serve().await.unwrap();

        dynconfig.stop().await.unwrap();
        dynconfig.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        struct Stalled;

        #[async_trait]
        impl DynconfigSource<Topology> for Stalled {
            async fn fetch(&self) -> Result<Topology> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(topology(0))
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.fetch_timeout = Duration::from_millis(20);
        let source: Arc<dyn DynconfigSource<Topology>> = Arc::new(Stalled);

        let result = Dynconfig::new(Some(source), "scheduler", config).await;
        assert!(matches!(result, Err(Error::FetchTimeout(_))));
    }
}
