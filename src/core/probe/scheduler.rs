/*!
Periodic probe task.

A `ScheduledTask` owns exactly one timer: a tokio task that sleeps for the
interval, runs one tick (probe, build reading, ingest) and sleeps again. The
next sleep starts only after the previous tick finished, so ticks never
overlap and slow probes stretch the cadence instead of piling up.

## States

`Created -> Scheduled -> Running -> Scheduled -> ... -> Cancelled`

`stop()` cancels the pending sleep. A tick that is already `Running` is not
interrupted: it completes, emits its reading, and the loop exits before
re-arming. The join handle returned by `stop()` resolves once that happens.
*/

use crate::config::ProbeConfig;
use crate::core::probe::debug_logger::get_debug_logger;
use crate::core::probe::executor::ProbeExecutor;
use crate::core::probe::reading::ReadingBuilder;
use crate::core::probe::sink::IngestSink;
use crate::core::probe::types::{Reading, SchedulerError, TaskState};
use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

static ACTIVE_TIMERS: AtomicUsize = AtomicUsize::new(0);

/// Number of armed probe timers in this process
pub fn active_timer_count() -> usize {
    ACTIVE_TIMERS.load(Ordering::SeqCst)
}

/// Counts one armed timer for as long as it lives
struct TimerGuard;

impl TimerGuard {
    fn arm() -> Self {
        ACTIVE_TIMERS.fetch_add(1, Ordering::SeqCst);
        TimerGuard
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        ACTIVE_TIMERS.fetch_sub(1, Ordering::SeqCst);
    }
}

/// One tick's work: probe, build the reading, hand it to the sink
pub struct TickPipeline {
    config: ProbeConfig,
    executor: ProbeExecutor,
    builder: ReadingBuilder,
    sink: Arc<dyn IngestSink>,
}

impl TickPipeline {
    pub fn new(config: ProbeConfig, executor: ProbeExecutor, sink: Arc<dyn IngestSink>) -> Self {
        Self {
            config,
            executor,
            builder: ReadingBuilder::new(),
            sink,
        }
    }

    pub fn with_reading_builder(mut self, builder: ReadingBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Run one tick; sink failures are logged, never propagated
    pub async fn run_once(&self) -> Reading {
        let url = self.config.url();
        let outcome = self
            .executor
            .execute(
                url,
                Some(self.config.pki_file()),
                Some(self.config.pki_passwd()),
            )
            .await;

        let reading = self.builder.build(self.config.asset_name(), &outcome, url);
        if let Err(e) = self.sink.ingest(reading.clone()) {
            get_debug_logger().sink_error(self.config.asset_name(), &e);
        }
        reading
    }
}

/// State shared between the task owner and its timer loop
struct TaskShared {
    state: AtomicU8,
    ticks: AtomicU64,
}

impl TaskShared {
    fn state(&self) -> TaskState {
        TaskState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, state: TaskState) {
        self.state.store(state.as_u8(), Ordering::SeqCst);
    }

    fn transition(&self, from: TaskState, to: TaskState) -> bool {
        self.state
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

/// Cancellation handle for the armed timer
struct TimerHandle {
    cancel_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

pub struct ScheduledTask {
    interval: Duration,
    pipeline: Arc<TickPipeline>,
    shared: Arc<TaskShared>,
    timer: Option<TimerHandle>,
}

impl ScheduledTask {
    pub fn new(interval: Duration, pipeline: TickPipeline) -> Self {
        Self {
            interval,
            pipeline: Arc::new(pipeline),
            shared: Arc::new(TaskShared {
                state: AtomicU8::new(TaskState::Created.as_u8()),
                ticks: AtomicU64::new(0),
            }),
            timer: None,
        }
    }

    pub fn state(&self) -> TaskState {
        self.shared.state()
    }

    /// Completed ticks so far
    pub fn ticks(&self) -> u64 {
        self.shared.ticks.load(Ordering::SeqCst)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Arm the timer on `runtime`; the first tick fires after one interval
    pub fn start(&mut self, runtime: &Handle) -> Result<(), SchedulerError> {
        if !self.shared.transition(TaskState::Created, TaskState::Scheduled) {
            return Err(SchedulerError::AlreadyStarted(self.shared.state()));
        }

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let guard = TimerGuard::arm();
        let join = runtime.spawn(run_timer_loop(
            self.interval,
            Arc::clone(&self.pipeline),
            Arc::clone(&self.shared),
            cancel_rx,
            guard,
        ));

        get_debug_logger().debug(
            "ScheduledTask",
            "timer_armed",
            &format!(
                "Probe for {} armed every {:?}",
                self.pipeline.config().asset_name(),
                self.interval
            ),
        );
        self.timer = Some(TimerHandle { cancel_tx, join });
        Ok(())
    }

    /// Cancel the pending timer
    ///
    /// Returns the timer loop's join handle, which resolves after an in-flight
    /// tick (if any) has emitted its reading. Errors when no timer is armed.
    pub fn stop(&mut self) -> Result<JoinHandle<()>, SchedulerError> {
        let timer = self.timer.take().ok_or(SchedulerError::NotScheduled)?;

        let _ = timer.cancel_tx.send(true);
        // A running tick finishes first; the loop marks Cancelled on exit
        self.shared.transition(TaskState::Scheduled, TaskState::Cancelled);

        get_debug_logger().debug(
            "ScheduledTask",
            "timer_cancelled",
            &format!("Probe for {} cancelled", self.pipeline.config().asset_name()),
        );
        Ok(timer.join)
    }
}

async fn run_timer_loop(
    interval: Duration,
    pipeline: Arc<TickPipeline>,
    shared: Arc<TaskShared>,
    mut cancel_rx: watch::Receiver<bool>,
    _guard: TimerGuard,
) {
    loop {
        tokio::select! {
            biased;
            changed = cancel_rx.changed() => {
                // Err means the owner dropped the task without stopping it
                if changed.is_err() || *cancel_rx.borrow() {
                    break;
                }
                continue;
            }
            _ = tokio::time::sleep(interval) => {}
        }

        if !shared.transition(TaskState::Scheduled, TaskState::Running) {
            break;
        }

        let reading = pipeline.run_once().await;
        let tick = shared.ticks.fetch_add(1, Ordering::SeqCst) + 1;
        let status = reading.readings.first().map(|m| m.status).unwrap_or_default();
        get_debug_logger().tick_complete(&reading.asset, status, tick);

        if *cancel_rx.borrow() || !shared.transition(TaskState::Running, TaskState::Scheduled) {
            break;
        }
    }

    shared.set_state(TaskState::Cancelled);
}
