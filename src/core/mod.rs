pub mod probe;

pub use probe::{
    plugin_info, plugin_init, plugin_reconfigure, plugin_register_ingest, plugin_shutdown,
    plugin_start, PluginHandle,
};
