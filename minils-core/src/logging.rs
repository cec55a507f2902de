use std::path::PathBuf;
use std::fmt;
use std::path::Path;
use tracing_subscriber::{
    EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
    fmt::{format::Writer, FormatEvent, FormatFields},
    registry::LookupSpan,
};
use tracing::{Event, Subscriber};

type InitError = Box<dyn std::error::Error + Send + Sync>;

/// Log targets emitted by the listing and the binary
const TARGETS: [&str; 6] = ["minils_core", "minils", "listing::open", "listing::entry", "listing::record", "cli"];

/// Colors stderr log lines by target so they stand apart from diagnostics
struct ColoredFormatter;

impl<S, N> FormatEvent<S, N> for ColoredFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();

        let (target_color, message_color) = match metadata.target() {
            "listing::open" => ("\x1b[38;5;51m", ""),   // cyan
            "listing::entry" => ("\x1b[38;5;82m", ""),  // lime
            "listing::record" => ("\x1b[38;5;226m", ""), // yellow
            "cli" => ("\x1b[38;5;213m", ""),            // pink
            _ => ("\x1b[2m", "\x1b[2m"),
        };

        let level_color = match *metadata.level() {
            tracing::Level::ERROR => "\x1b[31m",
            tracing::Level::WARN => "\x1b[33m",
            tracing::Level::INFO => "\x1b[32m",
            tracing::Level::DEBUG => "\x1b[34m",
            tracing::Level::TRACE => "\x1b[35m",
        };

        // [timestamp] [level] [target] message
        write!(writer, "{} ", chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"))?;
        write!(writer, "{}{:5}\x1b[0m ", level_color, metadata.level())?;
        write!(writer, "{}[{}]\x1b[0m ", target_color, metadata.target())?;
        write!(writer, "{}", message_color)?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer, "\x1b[0m")?;

        Ok(())
    }
}

/// Where log events go: a plain file when one is configured, otherwise
/// colored lines on stderr. Stdout carries nothing but the listing.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level filter for minils targets ("debug", "warn", "off", ...)
    pub level: String,
    pub file_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "off".to_string(),
            file_path: None,
        }
    }
}

impl LoggingConfig {
    /// Read MINILS_LOG_LEVEL and MINILS_LOG_FILE
    pub fn from_env() -> Self {
        Self {
            level: std::env::var("MINILS_LOG_LEVEL").unwrap_or_else(|_| "off".to_string()),
            file_path: std::env::var_os("MINILS_LOG_FILE").map(PathBuf::from),
        }
    }

    /// Fill level and file from the config file where the environment is silent
    pub fn with_fallbacks(mut self, level: Option<&str>, file_path: Option<&PathBuf>) -> Self {
        if std::env::var_os("MINILS_LOG_LEVEL").is_none() {
            if let Some(level) = level {
                self.level = level.to_string();
            }
        }
        if self.file_path.is_none() {
            self.file_path = file_path.cloned();
        }
        self
    }

    pub fn level<S: Into<String>>(mut self, level: S) -> Self {
        self.level = level.into();
        self
    }

    pub fn file_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Everything outside minils stays at warn; RUST_LOG may add directives
    fn filter(&self) -> Result<EnvFilter, InitError> {
        let mut filter = EnvFilter::from_default_env().add_directive("warn".parse()?);
        for target in TARGETS {
            filter = filter.add_directive(format!("{}={}", target, self.level).parse()?);
        }
        Ok(filter)
    }

    /// Install the global subscriber. Fails if one is already set.
    pub fn init(self) -> Result<(), InitError> {
        let filter = self.filter()?;
        let registry = tracing_subscriber::registry().with(filter);

        let installed = match &self.file_path {
            Some(path) => registry
                .with(tracing_subscriber::fmt::layer()
                    .with_writer(log_file(path))
                    .with_ansi(false))
                .try_init(),
            None => registry
                .with(tracing_subscriber::fmt::layer()
                    .event_format(ColoredFormatter)
                    .with_writer(std::io::stderr))
                .try_init(),
        };
        installed.map_err(|_| "a global subscriber is already set".into())
    }
}

/// One file that is appended to across runs, never rotated
fn log_file(path: &Path) -> tracing_appender::rolling::RollingFileAppender {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    let name = path.file_name().unwrap_or_else(|| std::ffi::OsStr::new("minils.log"));
    tracing_appender::rolling::never(dir, name)
}
