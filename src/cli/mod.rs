//! Command-line interface for metricbridge.
//!
//! Reads newline-delimited vendor records from stdin and writes encoded
//! OTLP payloads to stdout, one per admitted record.

use crate::core::{BridgeError, Config, ConfigBuilder, Result};
use crate::encode::{Encoded, OutputFormat};
use crate::mapper::Source;
use crate::pipeline::Pipeline;
use crate::rules::{shared, RuleStore, RuleWatcher};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

/// Normalize Netscout, Zabbix and SevOne records into OTLP metrics
#[derive(Parser, Debug, Default)]
#[command(name = "metricbridge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (default: ~/.config/metricbridge/config.yaml)
    #[arg(short, long, env = "METRICBRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Record source: netscout, zabbix or sevone
    #[arg(short, long, env = "METRICBRIDGE_SOURCE")]
    pub source: Option<Source>,

    /// Output format: json or protobuf
    #[arg(short, long, env = "METRICBRIDGE_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Topic name recorded as `kafka.topic`
    #[arg(short = 't', long, env = "METRICBRIDGE_INPUT_TOPIC")]
    pub input_topic: Option<String>,

    /// Fraction of records to process (0.0 to 1.0)
    #[arg(long, env = "METRICBRIDGE_SAMPLE_RATE")]
    pub sample_rate: Option<f64>,

    /// Zabbix name rule file
    #[arg(short, long, env = "METRICBRIDGE_RULES")]
    pub rules: Option<PathBuf>,

    /// Reload the rule file when it changes
    #[arg(long, env = "METRICBRIDGE_WATCH_RULES")]
    pub watch_rules: bool,

    /// Enable debug logging
    #[arg(short, long, env = "METRICBRIDGE_DEBUG")]
    pub debug: bool,

    /// Validate configuration and exit
    #[arg(long)]
    pub check_config: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Load configuration with proper precedence:
    /// 1. CLI arguments and environment variables
    /// 2. Config file
    /// 3. Defaults
    pub async fn load_config(&self) -> Result<Config> {
        let mut builder = ConfigBuilder::new();

        let config_path = match &self.config {
            Some(path) => Some(path.clone()),
            None => dirs::config_dir()
                .map(|d| d.join("metricbridge").join("config.yaml"))
                .filter(|p| p.exists()),
        };

        if let Some(path) = config_path {
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => builder = builder.from_yaml(&content)?,
                Err(e) if self.config.is_some() => {
                    return Err(BridgeError::config(format!(
                        "Failed to read config file {:?}: {}",
                        path, e
                    )));
                }
                Err(_) => {}
            }
        }

        self.apply_overrides(builder).build()
    }

    fn apply_overrides(&self, mut builder: ConfigBuilder) -> ConfigBuilder {
        if let Some(source) = self.source {
            builder = builder.source(source);
        }
        if let Some(format) = self.format {
            builder = builder.format(format);
        }
        if let Some(topic) = &self.input_topic {
            builder = builder.input_topic(topic.as_str());
        }
        if let Some(rate) = self.sample_rate {
            builder = builder.sample_rate(rate);
        }
        if let Some(rules) = &self.rules {
            builder = builder.rules_file(rules.clone());
        }
        if self.watch_rules {
            builder = builder.watch_rules(true);
        }
        builder.debug(self.debug)
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self, config: &Config) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let env_log_level = std::env::var("METRICBRIDGE_LOG_LEVEL")
            .unwrap_or_else(|_| config.logging.level.as_str().to_string());
        let log_level = if config.debug {
            "debug"
        } else {
            env_log_level.as_str()
        };

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        // stdout carries payloads, so logs go to stderr
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.logging.structured)
            .with_thread_ids(config.logging.structured)
            .with_line_number(config.logging.structured)
            .compact();

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| BridgeError::config(format!("Failed to initialize logging: {}", e)))?;

        Ok(())
    }
}

/// Execute metricbridge.
pub async fn execute(cli: Cli) -> Result<()> {
    let config = cli.load_config().await?;

    if cli.check_config {
        println!("Configuration is valid!");
        if let Some(source) = config.pipeline.source {
            println!("  Source: {}", source);
        }
        println!("  Format: {}", config.pipeline.format);
        println!("  Input topic: {}", config.pipeline.input_topic);
        println!("  Sample rate: {}", config.pipeline.sample_rate);
        match &config.rules.file {
            Some(path) => println!("  Rules: {:?}", path),
            None => println!("  Rules: bundled defaults"),
        }
        return Ok(());
    }

    cli.init_logging(&config)?;
    run(config).await
}

async fn run(config: Config) -> Result<()> {
    let rules = shared(RuleStore::load(config.rules.file.as_deref()));

    if config.rules.watch {
        match &config.rules.file {
            Some(path) => {
                let watcher = RuleWatcher::new(path.clone(), Arc::clone(&rules));
                tokio::spawn(async move {
                    if let Err(e) = watcher.watch().await {
                        tracing::error!("Rule watcher error: {}", e);
                    }
                });
            }
            None => tracing::warn!("Rule watching requested without a rule file, ignoring"),
        }
    }

    let pipeline = Pipeline::from_config(&config, rules)?;
    tracing::info!(
        source = %pipeline.mapper().source(),
        format = %pipeline.format(),
        topic = %config.pipeline.input_topic,
        "metricbridge started"
    );

    let mut input = BufReader::new(tokio::io::stdin());
    let mut out = BufWriter::new(tokio::io::stdout());
    let mut stats = StreamStats::default();

    tokio::select! {
        result = stream_records(&pipeline, &mut input, &mut out, &mut stats) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping...");
        }
    }

    out.flush().await?;
    tracing::info!(read = stats.read, written = stats.written, "metricbridge stopped");
    Ok(())
}

/// Record counters for one input stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Non-blank lines read
    pub read: u64,
    /// Payloads written
    pub written: u64,
}

/// Feed newline-delimited records from `input` through `pipeline` until
/// end of input.
///
/// A line that is not valid UTF-8 is a per-record failure and yields the
/// sentinel. Only I/O errors end the stream early.
pub async fn stream_records<R, W>(
    pipeline: &Pipeline,
    input: &mut R,
    out: &mut W,
    stats: &mut StreamStats,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let encoded = match std::str::from_utf8(&buf) {
            Ok(line) => {
                let line = line.trim_end_matches(&['\n', '\r'][..]);
                if line.trim().is_empty() {
                    continue;
                }
                stats.read += 1;
                pipeline.process(line)
            }
            Err(e) => {
                stats.read += 1;
                tracing::warn!(line = stats.read, error = %e, "Input line is not valid UTF-8");
                Some(Encoded::sentinel(pipeline.format()))
            }
        };

        if let Some(encoded) = encoded {
            write_payload(out, &encoded).await?;
            stats.written += 1;
        }
    }
    Ok(())
}

/// Frame one payload for a byte stream.
///
/// JSON documents are newline terminated. Protobuf payloads are prefixed
/// with their length as a varint.
pub fn frame(encoded: &Encoded) -> Vec<u8> {
    match encoded {
        Encoded::Json(text) => {
            let mut buf = Vec::with_capacity(text.len() + 1);
            buf.extend_from_slice(text.as_bytes());
            buf.push(b'\n');
            buf
        }
        Encoded::Protobuf(bytes) => {
            let mut buf = Vec::with_capacity(bytes.len() + 10);
            prost::encoding::encode_varint(bytes.len() as u64, &mut buf);
            buf.extend_from_slice(bytes);
            buf
        }
    }
}

async fn write_payload<W: AsyncWrite + Unpin>(out: &mut W, encoded: &Encoded) -> Result<()> {
    out.write_all(&frame(encoded)).await?;
    if encoded.format() == OutputFormat::Json {
        out.flush().await?;
    }
    Ok(())
}
