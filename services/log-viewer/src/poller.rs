// services/log-viewer/src/poller.rs
//
// Cancellable repeating poll of the log and health endpoints

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use svckit::{HealthSnapshot, LogRecord, ViewerError};

use crate::api::LogSource;

/// Completion of one endpoint read.
#[derive(Debug)]
pub enum PollEvent {
    Logs(Result<Vec<LogRecord>, ViewerError>),
    Health(Result<HealthSnapshot, ViewerError>),
}

/// Polls immediately when enabled, then every `interval`, until disabled.
///
/// The two reads of a tick run as separate tasks and report separately; a
/// slow or failing health read never holds back the logs.
pub struct Poller {
    source: Arc<dyn LogSource>,
    interval: Duration,
    events: UnboundedSender<PollEvent>,
    runtime: Handle,
    ticker: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn new(
        runtime: Handle,
        source: Arc<dyn LogSource>,
        interval: Duration,
        events: UnboundedSender<PollEvent>,
    ) -> Self {
        Self {
            source,
            interval,
            events,
            runtime,
            ticker: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Idempotent; never stacks a second ticker.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled {
            self.start();
        } else {
            self.stop();
        }
    }

    fn start(&mut self) {
        if self.is_running() {
            return;
        }

        let source = self.source.clone();
        let events = self.events.clone();
        let interval = self.interval;

        info!("Polling {} every {:?}", source.describe(), interval);
        self.ticker = Some(self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if events.is_closed() {
                    debug!("Event receiver dropped, stopping poller");
                    break;
                }
                tokio::spawn(read_logs(source.clone(), events.clone()));
                tokio::spawn(read_health(source.clone(), events.clone()));
            }
        }));
    }

    /// In-flight reads are left to finish and still report.
    fn stop(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
            info!("Polling paused");
        }
    }

    /// First read of a new view: the regular schedule when auto-refresh is
    /// on, otherwise a single read of both endpoints.
    pub fn launch(&mut self, auto_refresh: bool) {
        if auto_refresh {
            self.start();
        } else {
            self.refresh_now();
        }
    }

    /// One-shot read of both endpoints.
    pub fn refresh_now(&self) {
        self.refresh_logs_now();
        self.runtime
            .spawn(read_health(self.source.clone(), self.events.clone()));
    }

    /// One-shot logs read outside the regular schedule.
    pub fn refresh_logs_now(&self) {
        self.runtime
            .spawn(read_logs(self.source.clone(), self.events.clone()));
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn read_logs(source: Arc<dyn LogSource>, events: UnboundedSender<PollEvent>) {
    let result = source.fetch_logs().await;
    // Receiver gone means the view closed.
    let _ = events.send(PollEvent::Logs(result));
}

async fn read_health(source: Arc<dyn LogSource>, events: UnboundedSender<PollEvent>) {
    let result = source.fetch_health().await;
    let _ = events.send(PollEvent::Health(result));
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    const INTERVAL: Duration = Duration::from_millis(2000);

    #[derive(Default)]
    struct CountingSource {
        logs_calls: AtomicUsize,
        health_calls: AtomicUsize,
        fail_health: bool,
    }

    #[async_trait]
    impl LogSource for CountingSource {
        async fn fetch_logs(&self) -> Result<Vec<LogRecord>, ViewerError> {
            self.logs_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![LogRecord::new(svckit::LogLevel::Info, "tick")])
        }

        async fn fetch_health(&self) -> Result<HealthSnapshot, ViewerError> {
            self.health_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_health {
                return Err(ViewerError::NetworkError("connection refused".to_string()));
            }
            Ok(HealthSnapshot::default())
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    fn poller(source: Arc<CountingSource>) -> (Poller, UnboundedReceiver<PollEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Poller::new(Handle::current(), source, INTERVAL, tx), rx)
    }

    /// Let spawned tasks run without moving the paused clock.
    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    fn logs_calls(source: &CountingSource) -> usize {
        source.logs_calls.load(Ordering::SeqCst)
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_immediately_then_on_interval() {
        let source = Arc::new(CountingSource::default());
        let (mut poller, _rx) = poller(source.clone());

        poller.set_enabled(true);
        settle().await;
        assert_eq!(logs_calls(&source), 1);
        assert_eq!(source.health_calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_millis(1999)).await;
        settle().await;
        assert_eq!(logs_calls(&source), 1);

        tokio::time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(logs_calls(&source), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disable_stops_and_enable_restarts_immediately() {
        let source = Arc::new(CountingSource::default());
        let (mut poller, _rx) = poller(source.clone());

        poller.set_enabled(true);
        settle().await;
        assert_eq!(logs_calls(&source), 1);

        poller.set_enabled(false);
        assert!(!poller.is_running());
        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;
        assert_eq!(logs_calls(&source), 1);

        poller.set_enabled(true);
        settle().await;
        assert_eq!(logs_calls(&source), 2);

        tokio::time::advance(INTERVAL).await;
        settle().await;
        assert_eq!(logs_calls(&source), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_enable_does_not_stack_timers() {
        let source = Arc::new(CountingSource::default());
        let (mut poller, _rx) = poller(source.clone());

        poller.set_enabled(true);
        poller.set_enabled(true);
        settle().await;
        poller.set_enabled(true);
        settle().await;
        assert_eq!(logs_calls(&source), 1);

        tokio::time::advance(INTERVAL).await;
        settle().await;
        assert_eq!(logs_calls(&source), 2);

        poller.set_enabled(false);
        poller.set_enabled(false);
        assert!(!poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reads_report_independently() {
        let source = Arc::new(CountingSource {
            fail_health: true,
            ..Default::default()
        });
        let (mut poller, mut rx) = poller(source.clone());

        poller.set_enabled(true);
        settle().await;

        let mut logs_ok = false;
        let mut health_failed = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                PollEvent::Logs(Ok(logs)) => logs_ok = logs.len() == 1,
                PollEvent::Health(Err(_)) => health_failed = true,
                other => panic!("unexpected event {:?}", other),
            }
        }
        assert!(logs_ok);
        assert!(health_failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_logs_now_reads_logs_only() {
        let source = Arc::new(CountingSource::default());
        let (poller, mut rx) = poller(source.clone());

        poller.refresh_logs_now();
        settle().await;

        assert_eq!(logs_calls(&source), 1);
        assert_eq!(source.health_calls.load(Ordering::SeqCst), 0);
        assert!(matches!(rx.try_recv(), Ok(PollEvent::Logs(Ok(_)))));
        assert!(!poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_paused_start_reads_once() {
        let source = Arc::new(CountingSource::default());
        let (mut poller, mut rx) = poller(source.clone());

        poller.launch(false);
        settle().await;
        assert_eq!(logs_calls(&source), 1);
        assert_eq!(source.health_calls.load(Ordering::SeqCst), 1);

        let mut events = 0;
        while rx.try_recv().is_ok() {
            events += 1;
        }
        assert_eq!(events, 2);

        tokio::time::advance(INTERVAL * 3).await;
        settle().await;
        assert_eq!(logs_calls(&source), 1);
        assert_eq!(source.health_calls.load(Ordering::SeqCst), 1);
        assert!(!poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_launch_with_auto_refresh_reads_once_per_tick() {
        let source = Arc::new(CountingSource::default());
        let (mut poller, _rx) = poller(source.clone());

        poller.launch(true);
        settle().await;
        assert!(poller.is_running());
        assert_eq!(logs_calls(&source), 1);
        assert_eq!(source.health_calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(INTERVAL).await;
        settle().await;
        assert_eq!(logs_calls(&source), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_receiver_dropped() {
        let source = Arc::new(CountingSource::default());
        let (mut poller, rx) = poller(source.clone());

        poller.set_enabled(true);
        settle().await;
        drop(rx);

        tokio::time::advance(INTERVAL).await;
        settle().await;
        assert_eq!(logs_calls(&source), 1);
        assert!(!poller.is_running());
    }
}
