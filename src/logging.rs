use tracing::Level;

/// How much the CLI writes to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Silent,
    Normal,
    Debug,
}

impl Verbosity {
    /// `--debug` wins over `--silent`.
    pub fn from_flags(debug: bool, silent: bool) -> Self {
        if debug {
            Verbosity::Debug
        } else if silent {
            Verbosity::Silent
        } else {
            Verbosity::Normal
        }
    }

    pub fn level(&self) -> Level {
        match self {
            Verbosity::Silent => Level::WARN,
            Verbosity::Normal => Level::INFO,
            Verbosity::Debug => Level::DEBUG,
        }
    }

    pub fn can_log_info(&self) -> bool {
        self.level() >= Level::INFO
    }

    pub fn is_debug(&self) -> bool {
        *self == Verbosity::Debug
    }
}

/// Install the stderr subscriber. Later calls are no-ops.
pub fn init(verbosity: Verbosity) {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(verbosity.level())
        .without_time()
        .with_target(false)
        .with_level(verbosity.is_debug())
        .try_init();
}
