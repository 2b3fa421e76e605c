use log::LevelFilter;
use simplelog::*;
use std::fs::File;
use std::path::PathBuf;

/// Log targets, one per category
pub const TARGET_API_CALLS: &str = "api_calls";
pub const TARGET_LIKES: &str = "likes";
pub const TARGET_COMMENTS: &str = "comments";
pub const TARGET_IMAGES: &str = "images";
pub const TARGET_SESSION: &str = "session";

/// Logging configuration for the board client
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Master switch to enable/disable all logging
    pub enabled: bool,
    /// Path to the log file
    pub log_file: PathBuf,
    /// Whether to clear the log file on startup
    pub clear_on_startup: bool,
    /// Feature flags for specific logging categories
    pub features: LogFeatures,
    /// Overall log level
    pub level: LevelFilter,
}

/// Feature flags for specific logging categories
#[derive(Debug, Clone)]
pub struct LogFeatures {
    /// Log HTTP requests and failures
    pub api_calls: bool,
    /// Log like toggles, throttling and completions
    pub likes: bool,
    /// Log comment submit/delete
    pub comments: bool,
    /// Log image URL resolution
    pub images: bool,
    /// Log view session lifecycle (open, load, close, stale completions)
    pub session: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_file: PathBuf::from("board_debug.log"),
            clear_on_startup: true,
            features: LogFeatures::default(),
            // Category macros log at debug; the feature flags decide which show
            level: LevelFilter::Debug,
        }
    }
}

impl Default for LogFeatures {
    fn default() -> Self {
        Self {
            api_calls: true,
            likes: true,
            comments: true,
            images: true,
            session: true,
        }
    }
}

impl LogFeatures {
    /// Targets whose category is switched off
    pub fn disabled_targets(&self) -> Vec<&'static str> {
        [
            (self.api_calls, TARGET_API_CALLS),
            (self.likes, TARGET_LIKES),
            (self.comments, TARGET_COMMENTS),
            (self.images, TARGET_IMAGES),
            (self.session, TARGET_SESSION),
        ]
        .into_iter()
        .filter(|(on, _)| !on)
        .map(|(_, target)| target)
        .collect()
    }
}

impl LogConfig {
    /// Create a new log configuration with all features disabled
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Create a minimal log configuration (only errors and warnings)
    pub fn minimal() -> Self {
        Self {
            enabled: true,
            level: LevelFilter::Warn,
            features: LogFeatures {
                api_calls: false,
                likes: false,
                comments: false,
                images: false,
                session: false,
            },
            ..Default::default()
        }
    }

    /// Create a verbose log configuration (all features enabled)
    pub fn verbose() -> Self {
        Self {
            enabled: true,
            level: LevelFilter::Trace,
            features: LogFeatures::default(),
            ..Default::default()
        }
    }
}

/// Initialize the logging system with the given configuration
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    if !config.enabled {
        // Initialize with no-op logger
        let _ = WriteLogger::init(LevelFilter::Off, Config::default(), std::io::sink());
        return Ok(());
    }

    // Clear log file if requested
    if config.clear_on_startup {
        let _ = File::create(&config.log_file)?;
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    // Configure log format
    let mut builder = ConfigBuilder::new();
    builder.set_time_format_rfc3339();
    // Falls back to UTC when the local offset cannot be determined
    let _ = builder.set_time_offset_to_local();
    for target in config.features.disabled_targets() {
        builder.add_filter_ignore_str(target);
    }

    WriteLogger::init(config.level, builder.build(), log_file)?;

    log::info!("Logging initialized: file={}, level={:?}", config.log_file.display(), config.level);
    log::debug!("Log features: {:?}", config.features);

    Ok(())
}

/// Macro for logging API calls
#[macro_export]
macro_rules! log_api_call {
    ($($arg:tt)*) => {
        log::debug!(target: $crate::logging::TARGET_API_CALLS, $($arg)*)
    };
}

/// Macro for logging like toggles
#[macro_export]
macro_rules! log_like {
    ($($arg:tt)*) => {
        log::debug!(target: $crate::logging::TARGET_LIKES, $($arg)*)
    };
}

/// Macro for logging comment operations
#[macro_export]
macro_rules! log_comment {
    ($($arg:tt)*) => {
        log::debug!(target: $crate::logging::TARGET_COMMENTS, $($arg)*)
    };
}

/// Macro for logging image resolution
#[macro_export]
macro_rules! log_image {
    ($($arg:tt)*) => {
        log::debug!(target: $crate::logging::TARGET_IMAGES, $($arg)*)
    };
}

/// Macro for logging view session lifecycle
#[macro_export]
macro_rules! log_session {
    ($($arg:tt)*) => {
        log::info!(target: $crate::logging::TARGET_SESSION, $($arg)*)
    };
}
