//! Logging configuration for the extension's native side.

use std::sync::RwLock;

use log::{LevelFilter, Log, Metadata, Record};
use once_cell::sync::Lazy;

use crate::error::Error;

/// Target used by every record this crate emits.
pub(crate) const LOG_TARGET: &str = "test_ext";

const FILTER_ENV: &str = "TEST_EXT_LOG";
const FALLBACK_FILTER_ENV: &str = "RUST_LOG";
const DEFAULT_LEVEL: LevelFilter = LevelFilter::Warn;

static EXT_LOGGER: Lazy<ExtLogger> = Lazy::new(ExtLogger::new);
// `log::set_logger` succeeds at most once per process.
static LOGGER_INSTALLED: Lazy<bool> = Lazy::new(|| log::set_logger(&*EXT_LOGGER).is_ok());

#[derive(Clone, Debug, PartialEq)]
struct TargetFilter {
    target: String,
    level: LevelFilter,
}

/// A parsed `RUST_LOG`-style filter.
#[derive(Clone, Debug, PartialEq)]
struct LogFilter {
    default: LevelFilter,
    directives: Vec<TargetFilter>,
}

impl LogFilter {
    fn default_for_level(level: LevelFilter) -> Self {
        Self {
            default: LevelFilter::Off,
            directives: vec![TargetFilter {
                target: LOG_TARGET.to_string(),
                level,
            }],
        }
    }

    fn parse(spec: &str) -> Result<Self, String> {
        let mut filter = Self {
            default: LevelFilter::Off,
            directives: Vec::new(),
        };

        for (index, directive) in spec.split(',').map(str::trim).enumerate() {
            if directive.is_empty() {
                continue;
            }
            let Some((target, level)) = directive.split_once('=') else {
                match parse_level(directive) {
                    Some(level) => filter.default = level,
                    None => filter.directives.push(TargetFilter {
                        target: directive.to_string(),
                        level: LevelFilter::Trace,
                    }),
                }
                continue;
            };

            let (target, level) = (target.trim(), level.trim());
            if target.is_empty() {
                return Err(format!("empty log directive at position {index}"));
            }
            if level.is_empty() {
                return Err(format!("missing log level for target `{target}`"));
            }
            let level = parse_level(level).ok_or_else(|| format!("invalid level `{level}`"))?;
            filter.directives.push(TargetFilter {
                target: target.to_string(),
                level,
            });
        }

        Ok(filter)
    }

    /// Level allowed for `target`; the longest matching directive wins, later ones on ties.
    fn level_for(&self, target: &str) -> LevelFilter {
        self.directives
            .iter()
            .filter(|directive| target.starts_with(directive.target.as_str()))
            .max_by_key(|directive| directive.target.len())
            .map_or(self.default, |directive| directive.level)
    }

    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level_for(metadata.target())
    }

    fn max_level(&self) -> LevelFilter {
        self.directives
            .iter()
            .map(|directive| directive.level)
            .chain(Some(self.default))
            .max()
            .unwrap_or(LevelFilter::Off)
    }
}

struct ExtLogger {
    filter: RwLock<LogFilter>,
}

impl ExtLogger {
    fn new() -> Self {
        Self {
            filter: RwLock::new(LogFilter::default_for_level(DEFAULT_LEVEL)),
        }
    }

    fn update(&self, filter: LogFilter) {
        let mut guard = self.filter.write().unwrap_or_else(|err| err.into_inner());
        *guard = filter;
    }
}

impl Log for ExtLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        let guard = self.filter.read().unwrap_or_else(|err| err.into_inner());
        guard.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{}", format_record(record));
        }
    }

    fn flush(&self) {}
}

fn format_record(record: &Record) -> String {
    format!("{} {}: {}", record.level(), record.target(), record.args())
}

fn parse_level(value: &str) -> Option<LevelFilter> {
    if value.eq_ignore_ascii_case("warning") {
        return Some(LevelFilter::Warn);
    }
    value.parse().ok()
}

fn resolve_filter(lookup: impl Fn(&str) -> Option<String>) -> Result<LogFilter, Error> {
    match lookup(FILTER_ENV).or_else(|| lookup(FALLBACK_FILTER_ENV)) {
        Some(filter) => LogFilter::parse(&filter).map_err(|reason| Error::InvalidFilter {
            filter,
            reason,
        }),
        None => Ok(LogFilter::default_for_level(DEFAULT_LEVEL)),
    }
}

fn install(filter: LogFilter) {
    let max_level = filter.max_level();
    EXT_LOGGER.update(filter);
    log::set_max_level(max_level);
}

/// Installs the process logger and applies the filter from the environment.
///
/// `TEST_EXT_LOG` takes precedence over `RUST_LOG`. Safe to call more than
/// once; each call re-reads the environment.
pub(crate) fn init() -> Result<(), Error> {
    init_with(|name| std::env::var(name).ok())
}

/// Like [`init`], reading configuration through `lookup`.
///
/// An unparsable filter still leaves the default filter in place before the
/// error is returned.
fn init_with(lookup: impl Fn(&str) -> Option<String>) -> Result<(), Error> {
    if !*LOGGER_INSTALLED {
        return Err(Error::LoggerAlreadySet);
    }
    let (filter, outcome) = match resolve_filter(lookup) {
        Ok(filter) => (filter, Ok(())),
        Err(err) => (LogFilter::default_for_level(DEFAULT_LEVEL), Err(err)),
    };
    install(filter);
    outcome
}
