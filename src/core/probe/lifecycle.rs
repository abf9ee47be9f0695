/*!
Plugin lifecycle: init, register_ingest, start, reconfigure, shutdown.

Each started instance owns an `ExecutionContext`: a dedicated worker thread
running a current-thread tokio runtime. The instance's `ScheduledTask` arms its
timer on that runtime, so every tick of one instance runs serially on a thread
that belongs to nobody else, and the host thread calling these functions is
never blocked by a probe.

Reconfigure is a full restart. The old timer is cancelled, its in-flight tick
drained and its worker joined before the new instance starts, so no tick ever
runs against a configuration that is being replaced.
*/

use crate::config::{default_config_document, parse_config_document, ProbeConfig};
use crate::core::probe::debug_logger::get_debug_logger;
use crate::core::probe::executor::ProbeExecutor;
use crate::core::probe::reading::{ClockTrait, ReadingBuilder};
use crate::core::probe::scheduler::{ScheduledTask, TickPipeline};
use crate::core::probe::sink::IngestSink;
use crate::core::probe::transport::{default_transport, ProbeTransport};
use crate::core::probe::types::{PluginError, PluginInfo, TaskState};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const PLUGIN_NAME: &str = "HTTP Status";
pub const PLUGIN_MODE: &str = "async";
pub const PLUGIN_TYPE: &str = "south";
pub const PLUGIN_INTERFACE: &str = "1.0";

static ACTIVE_WORKERS: AtomicUsize = AtomicUsize::new(0);

/// Number of live probe worker threads in this process
pub fn active_worker_count() -> usize {
    ACTIVE_WORKERS.load(Ordering::SeqCst)
}

struct WorkerGuard;

impl WorkerGuard {
    fn enter() -> Self {
        ACTIVE_WORKERS.fetch_add(1, Ordering::SeqCst);
        WorkerGuard
    }
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        ACTIVE_WORKERS.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Dedicated worker thread driving a single-threaded runtime
pub struct ExecutionContext {
    runtime: Handle,
    stop_tx: Option<oneshot::Sender<Option<JoinHandle<()>>>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ExecutionContext {
    pub fn spawn(name: &str) -> Result<Self, PluginError> {
        let (handle_tx, handle_rx) = mpsc::channel::<Result<Handle, String>>();
        let (stop_tx, stop_rx) = oneshot::channel::<Option<JoinHandle<()>>>();

        let thread = thread::Builder::new()
            .name(format!("httpstatus-{}", name.replace('\0', "")))
            .spawn(move || {
                let _guard = WorkerGuard::enter();
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = handle_tx.send(Err(format!("Failed to build runtime: {}", e)));
                        return;
                    }
                };
                let _ = handle_tx.send(Ok(runtime.handle().clone()));

                // Run until told to stop, then let the cancelled timer drain
                runtime.block_on(async move {
                    if let Ok(Some(drain)) = stop_rx.await {
                        let _ = drain.await;
                    }
                });
            })
            .map_err(|e| PluginError::Worker(format!("Failed to spawn worker thread: {}", e)))?;

        let runtime = match handle_rx.recv() {
            Ok(Ok(runtime)) => runtime,
            Ok(Err(e)) => {
                let _ = thread.join();
                return Err(PluginError::Worker(e));
            }
            Err(_) => {
                let _ = thread.join();
                return Err(PluginError::Worker("worker exited during startup".to_string()));
            }
        };

        Ok(Self {
            runtime,
            stop_tx: Some(stop_tx),
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> &Handle {
        &self.runtime
    }

    /// Stop the runtime after `drain` completes and join the worker thread
    pub fn shutdown(mut self, drain: Option<JoinHandle<()>>) -> Result<(), PluginError> {
        self.stop_and_join(drain)
    }

    fn stop_and_join(&mut self, drain: Option<JoinHandle<()>>) -> Result<(), PluginError> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(drain);
        }
        match self.thread.take() {
            Some(thread) => thread
                .join()
                .map_err(|_| PluginError::Worker("worker thread panicked".to_string())),
            None => Ok(()),
        }
    }
}

impl Drop for ExecutionContext {
    fn drop(&mut self) {
        let _ = self.stop_and_join(None);
    }
}

struct RunningInstance {
    task: ScheduledTask,
    context: ExecutionContext,
}

/// Opaque per-instance handle passed between lifecycle calls
pub struct PluginHandle {
    config: ProbeConfig,
    sink: Option<Arc<dyn IngestSink>>,
    transport: Option<Arc<dyn ProbeTransport>>,
    clock: Option<Arc<dyn ClockTrait>>,
    running: Option<RunningInstance>,
}

impl PluginHandle {
    fn new(config: ProbeConfig) -> Self {
        Self {
            config,
            sink: None,
            transport: None,
            clock: None,
            running: None,
        }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Use a specific transport instead of the default isahc client
    pub fn with_transport(mut self, transport: Arc<dyn ProbeTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn ClockTrait>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn task_state(&self) -> Option<TaskState> {
        self.running.as_ref().map(|r| r.task.state())
    }

    pub fn ticks(&self) -> u64 {
        self.running.as_ref().map(|r| r.task.ticks()).unwrap_or(0)
    }
}

impl std::fmt::Debug for PluginHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginHandle")
            .field("config", &self.config)
            .field("sink_registered", &self.sink.is_some())
            .field("running", &self.running.is_some())
            .finish()
    }
}

pub fn plugin_info() -> PluginInfo {
    PluginInfo {
        name: PLUGIN_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        mode: PLUGIN_MODE.to_string(),
        plugin_type: PLUGIN_TYPE.to_string(),
        interface: PLUGIN_INTERFACE.to_string(),
        config: default_config_document(),
    }
}

/// Validate a config document into a fresh, stopped handle
pub fn plugin_init(config: &Value) -> Result<PluginHandle, PluginError> {
    let debug_logger = get_debug_logger();
    match parse_config_document(config) {
        Ok(config) => {
            debug_logger.lifecycle(
                "plugin_init",
                config.asset_name(),
                &format!("Initialised with {:?}", config),
            );
            Ok(PluginHandle::new(config))
        }
        Err(e) => {
            debug_logger.error("Lifecycle", "plugin_init", &format!("Invalid configuration: {}", e));
            Err(e.into())
        }
    }
}

/// Register the sink every subsequent tick delivers to
pub fn plugin_register_ingest(handle: &mut PluginHandle, sink: Arc<dyn IngestSink>) {
    get_debug_logger().lifecycle(
        "plugin_register_ingest",
        handle.config.asset_name(),
        "Ingest sink registered",
    );
    handle.sink = Some(sink);
}

pub fn plugin_start(handle: &mut PluginHandle) -> Result<(), PluginError> {
    let debug_logger = get_debug_logger();
    let result = start_instance(handle);
    match &result {
        Ok(()) => debug_logger.lifecycle(
            "plugin_start",
            handle.config.asset_name(),
            &format!("Probing {} every {}s", handle.config.url(), handle.config.rate_secs()),
        ),
        Err(e) => debug_logger.error(
            "Lifecycle",
            "plugin_start",
            &format!("{} failed to start: {}", handle.config.asset_name(), e),
        ),
    }
    result
}

fn start_instance(handle: &mut PluginHandle) -> Result<(), PluginError> {
    if handle.running.is_some() {
        return Err(PluginError::AlreadyStarted);
    }
    let sink = handle.sink.clone().ok_or(PluginError::SinkNotRegistered)?;
    let transport = match &handle.transport {
        Some(transport) => Arc::clone(transport),
        None => default_transport()?,
    };
    let builder = match &handle.clock {
        Some(clock) => ReadingBuilder::with_clock(Arc::clone(clock)),
        None => ReadingBuilder::new(),
    };

    let executor = ProbeExecutor::new(transport).with_timeout(handle.config.timeout());
    let pipeline =
        TickPipeline::new(handle.config.clone(), executor, sink).with_reading_builder(builder);
    let mut task = ScheduledTask::new(handle.config.interval(), pipeline);

    let context = ExecutionContext::spawn(handle.config.asset_name())?;
    task.start(context.handle())?;

    handle.running = Some(RunningInstance { task, context });
    Ok(())
}

/// Full restart: shut the old instance down, init and start the new one
///
/// The registered sink and any injected transport or clock carry over.
pub fn plugin_reconfigure(mut handle: PluginHandle, new_config: &Value) -> Result<PluginHandle, PluginError> {
    let debug_logger = get_debug_logger();
    debug_logger.lifecycle(
        "plugin_reconfigure",
        handle.config.asset_name(),
        &format!("Reconfiguring {:?}", handle.config),
    );

    if handle.running.is_some() {
        plugin_shutdown(&mut handle)?;
    }

    let mut new_handle = plugin_init(new_config)?;
    new_handle.sink = handle.sink.take();
    new_handle.transport = handle.transport.take();
    new_handle.clock = handle.clock.take();

    plugin_start(&mut new_handle)?;
    Ok(new_handle)
}

/// Stop the timer, drain an in-flight tick and release the worker
pub fn plugin_shutdown(handle: &mut PluginHandle) -> Result<(), PluginError> {
    let debug_logger = get_debug_logger();
    let asset = handle.config.asset_name().to_string();

    let Some(RunningInstance { mut task, context }) = handle.running.take() else {
        debug_logger.error("Lifecycle", "plugin_shutdown", &format!("{} is not started", asset));
        return Err(PluginError::NotStarted);
    };

    let result = match task.stop() {
        Ok(drain) => context.shutdown(Some(drain)),
        Err(e) => {
            context.shutdown(None)?;
            Err(e.into())
        }
    };

    match &result {
        Ok(()) => debug_logger.lifecycle(
            "plugin_shutdown",
            &asset,
            &format!("Stopped after {} tick(s)", task.ticks()),
        ),
        Err(e) => debug_logger.error("Lifecycle", "plugin_shutdown", &format!("{}: {}", asset, e)),
    }
    result
}
