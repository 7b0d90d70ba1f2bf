use chrono::Local;
use core::fmt;
use log::{self, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::{self, Write};

/// Initialize logging with the default max log level (WARN).
pub fn init() -> Result<(), SetLoggerError> {
    static LOGGER: SimpleLogger = SimpleLogger;
    log::set_logger(&LOGGER)?;
    log::set_max_level(LevelFilter::Warn);
    Ok(())
}

/// Parse a max log level name; unknown names are rejected.
pub fn parse_level(level: &str) -> Result<LevelFilter, String> {
    level
        .parse()
        .map_err(|_| format!("unknown log level `{}`", level))
}

/// Reset max log level.
pub fn set_max_level(level: LevelFilter) {
    log::set_max_level(level);
}

/// Log lines go to stderr so that dumps on stdout stay clean.
fn print(args: fmt::Arguments) {
    let _ = io::stderr().write_fmt(args);
}

#[allow(dead_code)]
#[repr(u8)]
enum ColorCode {
    Black = 30,
    Red = 31,
    Green = 32,
    Yellow = 33,
    Blue = 34,
    Magenta = 35,
    Cyan = 36,
    White = 37,
    BrightBlack = 90,
    BrightRed = 91,
    BrightGreen = 92,
    BrightYellow = 93,
    BrightBlue = 94,
    BrightMagenta = 95,
    BrightCyan = 96,
    BrightWhite = 97,
}

/// Add escape sequence to print with color in Linux console
macro_rules! with_color {
    ($color_code:expr, $($arg:tt)*) => {{
        #[cfg(feature = "colorless-log")]
        { let _ = $color_code; format_args!($($arg)*) }
        #[cfg(not(feature = "colorless-log"))]
        { format_args!("\u{1B}[{}m{}\u{1B}[m", $color_code as u8, format_args!($($arg)*)) }
    }};
}

struct SimpleLogger;

impl Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level = record.level();
        let target = record.target();
        let level_color = match level {
            Level::Error => ColorCode::BrightRed,
            Level::Warn => ColorCode::BrightYellow,
            Level::Info => ColorCode::BrightGreen,
            Level::Debug => ColorCode::BrightCyan,
            Level::Trace => ColorCode::BrightBlack,
        };
        let args_color = match level {
            Level::Error => ColorCode::Red,
            Level::Warn => ColorCode::Yellow,
            Level::Info => ColorCode::Green,
            Level::Debug => ColorCode::Cyan,
            Level::Trace => ColorCode::BrightBlack,
        };
        print(with_color!(
            ColorCode::White,
            "[{time} {level} {info} {data}\n",
            time = Local::now().format("%H:%M:%S%.6f"),
            level = with_color!(level_color, "{level:<5}"),
            info = with_color!(ColorCode::White, "{target}]"),
            data = with_color!(args_color, "{args}", args = record.args()),
        ));
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}
