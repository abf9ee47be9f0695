pub mod debug_logger;
pub mod executor;
pub mod lifecycle;
pub mod reading;
pub mod scheduler;
pub mod sink;
pub mod transport;
pub mod types;

// Re-export commonly used items
pub use debug_logger::{get_debug_logger, EnhancedDebugLogger};
pub use executor::ProbeExecutor;
pub use lifecycle::{
    active_worker_count, plugin_info, plugin_init, plugin_reconfigure, plugin_register_ingest,
    plugin_shutdown, plugin_start, ExecutionContext, PluginHandle,
};
pub use reading::{ClockTrait, ReadingBuilder, SystemClock};
pub use scheduler::{active_timer_count, ScheduledTask, TickPipeline};
pub use sink::{ChannelSink, IngestSink, JsonlFileSink, StdoutSink};
pub use transport::{default_transport, ProbeRequest, ProbeTransport, TransportResponse};
pub use types::*;

#[cfg(feature = "isahc-transport")]
pub use transport::IsahcTransport;
