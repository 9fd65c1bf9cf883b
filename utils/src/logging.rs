// Category-based logging infrastructure
//
// This will be used from multiple threads, so it needs
// to be stateless
//
// Austin Shafer - 2020
#[allow(dead_code, non_camel_case_types)]
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum LogLevel {
    // in order of highest priority
    critical, // Urgent and must always be displayed
    error,
    debug,     // debugging related, not verbose
    info,      // more verbose
    profiling, // profiling related timing
}

/// The default threshold: debug and everything more urgent
const DEFAULT_LOG_LEVEL: u32 = 2;

lazy_static! {
    /// The active threshold, read once from `VKMS_LOG_LEVEL`.
    ///
    /// Accepts either the numeric level or the level name.
    static ref LOG_THRESHOLD: u32 = std::env::var("VKMS_LOG_LEVEL")
        .ok()
        .and_then(|val| LogLevel::parse_threshold(&val))
        .unwrap_or(DEFAULT_LOG_LEVEL);
}

impl LogLevel {
    pub fn get_name(&self) -> &'static str {
        match self {
            LogLevel::critical => "critical",
            LogLevel::error => "error",
            LogLevel::debug => "debug",
            LogLevel::info => "info",
            LogLevel::profiling => "profiling",
        }
    }

    pub fn get_level(&self) -> u32 {
        match self {
            LogLevel::critical => 0,
            LogLevel::error => 1,
            LogLevel::debug => 2,
            LogLevel::info => 3,
            LogLevel::profiling => 4,
        }
    }

    /// Parse a threshold from either a number or a level name
    pub fn parse_threshold(val: &str) -> Option<u32> {
        let val = val.trim();
        if let Ok(num) = val.parse::<u32>() {
            return Some(num);
        }

        [
            LogLevel::critical,
            LogLevel::error,
            LogLevel::debug,
            LogLevel::info,
            LogLevel::profiling,
        ]
        .iter()
        .find(|level| level.get_name().eq_ignore_ascii_case(val))
        .map(|level| level.get_level())
    }

    /// Should messages at this level be printed
    pub fn is_enabled(&self) -> bool {
        self.get_level() <= *LOG_THRESHOLD
    }
}

#[macro_export]
macro_rules! log_internal {
    ($loglevel:expr, $($format_args:tt)+) => ({
        let level = $loglevel;
        if level.is_enabled() {
            println!("[{:?}]<{}> {}:{} - {}",
                     $crate::timing::get_current_millis(),
                     level.get_name(),
                     file!(),
                     line!(),
                     format!($($format_args)+)
            );
        }
    })
}

#[macro_export]
macro_rules! critical {
    ($($format_args:tt)+) => ({
        $crate::log_internal!($crate::logging::LogLevel::critical, $($format_args)+)
    })
}

#[macro_export]
macro_rules! error {
    ($($format_args:tt)+) => ({
        $crate::log_internal!($crate::logging::LogLevel::error, $($format_args)+)
    })
}

#[macro_export]
macro_rules! debug {
    ($($format_args:tt)+) => ({
        $crate::log_internal!($crate::logging::LogLevel::debug, $($format_args)+)
    })
}

#[macro_export]
macro_rules! info {
    ($($format_args:tt)+) => ({
        $crate::log_internal!($crate::logging::LogLevel::info, $($format_args)+)
    })
}

#[macro_export]
macro_rules! profiling {
    ($($format_args:tt)+) => ({
        $crate::log_internal!($crate::logging::LogLevel::profiling, $($format_args)+)
    })
}
