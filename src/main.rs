use httpstatus::cli::Cli;
use httpstatus::core::probe::{
    plugin_info, plugin_init, plugin_reconfigure, plugin_register_ingest, plugin_shutdown,
    plugin_start, ChannelSink, IngestSink, JsonlFileSink, StdoutSink,
};
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse_args();

    if cli.info {
        println!("{}", serde_json::to_string_pretty(&plugin_info())?);
        return Ok(());
    }

    let output: Box<dyn IngestSink> = match &cli.output {
        Some(path) => Box::new(JsonlFileSink::open(path)?),
        None => Box::new(StdoutSink),
    };

    // Probe workers hand readings over a channel; this thread does the output
    let (channel_sink, mut readings) = ChannelSink::new();
    let mut handle = plugin_init(&cli.file_config()?.to_document())?;
    plugin_register_ingest(&mut handle, Arc::new(channel_sink));
    plugin_start(&mut handle)?;

    let mut reload = ReloadSignal::new()?;
    let mut emitted = 0usize;

    loop {
        tokio::select! {
            reading = readings.recv() => {
                let Some(reading) = reading else { break };
                if let Err(e) = output.ingest(reading) {
                    eprintln!("Failed to write reading: {}", e);
                }
                emitted += 1;
                if cli.count.is_some_and(|limit| emitted >= limit) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
            _ = reload.recv() => {
                let document = cli.file_config()?.to_document();
                handle = plugin_reconfigure(handle, &document)?;
                eprintln!("Configuration reloaded: probing {}", handle.config().url());
            }
        }
    }

    plugin_shutdown(&mut handle)?;
    Ok(())
}

/// SIGHUP on Unix; never fires elsewhere
struct ReloadSignal {
    #[cfg(unix)]
    hangup: tokio::signal::unix::Signal,
}

impl ReloadSignal {
    fn new() -> std::io::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            Ok(Self {
                hangup: signal(SignalKind::hangup())?,
            })
        }
        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    async fn recv(&mut self) {
        #[cfg(unix)]
        {
            if self.hangup.recv().await.is_none() {
                std::future::pending::<()>().await;
            }
        }
        #[cfg(not(unix))]
        {
            std::future::pending::<()>().await;
        }
    }
}
