use lazy_static::lazy_static;
use log::{Level, LevelFilter, Log, Metadata, Record};
use nu_ansi_term::{Color, Style};

lazy_static! {
    static ref ERROR_STYLE: Style = Style::new().fg(Color::Red).bold();
    static ref WARN_STYLE: Style = Style::new().fg(Color::Yellow).bold();
    static ref INFO_STYLE: Style = Style::new().fg(Color::Cyan);
    static ref DEBUG_STYLE: Style = Style::new().fg(Color::Fixed(7)).dimmed();
    static ref TARGET_STYLE: Style = Style::new().fg(Color::Blue);
}

static LOGGER: Logger = Logger;

/// Writes log records to stderr, one styled line each.
pub struct Logger;

impl Logger {
    /// Installs the logger. `Debug` level when `debug` is set, `Warn` otherwise.
    pub fn init(debug: bool) {
        let level = if debug { LevelFilter::Debug } else { LevelFilter::Warn };

        // a logger may already be installed, e.g. by another test
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(level);
        }
    }

    pub fn format(record: &Record) -> String {
        let style = match record.level() {
            Level::Error => *ERROR_STYLE,
            Level::Warn => *WARN_STYLE,
            Level::Info => *INFO_STYLE,
            Level::Debug | Level::Trace => *DEBUG_STYLE,
        };

        format!(
            "{} {} {}",
            style.paint(format!("[{:<5}]", record.level())),
            TARGET_STYLE.paint(record.target()),
            record.args()
        )
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{}", Self::format(record));
        }
    }

    fn flush(&self) {}
}

/// Evaluates an expression and logs how long it took at debug level.
#[macro_export]
macro_rules! timed {
    ($expre:expr) => {
        {
            let start = std::time::Instant::now();
            let result = $expre;
            let mut msg = stringify!($expre).to_owned();
            msg.truncate(20);
            log::debug!("[{}:{}] {}: {} ms", file!(), line!(), msg, start.elapsed().as_millis());
            result
        }
    };
}
