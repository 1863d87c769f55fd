/// Log file setup for the upgrade run
use anyhow::Context;
use chrono::Local;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Where and how verbosely to log
#[derive(Debug, Clone)]
pub struct LogSettings {
    /// File the log is appended to
    pub file: PathBuf,
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Also write events to stderr
    pub console: bool,
}

/// Formats each event as `[YYYY-mm-dd HH:MM:SS LEVEL] message`
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "[{} {}] ",
            Local::now().format(TIMESTAMP_FORMAT),
            event.metadata().level()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Build the subscriber for a run. It is not installed globally; callers
/// scope it with `tracing::subscriber::set_default` or `with_default`.
pub fn subscriber(
    settings: &LogSettings,
) -> anyhow::Result<impl Subscriber + Send + Sync + 'static> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.file)
        .with_context(|| format!("Failed to open log file {}", settings.file.display()))?;
    let file: Arc<File> = Arc::new(file);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .with_context(|| format!("Invalid log level: {}", settings.level))?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(file)
        .event_format(LineFormat);

    let console_layer = settings.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .event_format(LineFormat)
    });

    Ok(tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer))
}
