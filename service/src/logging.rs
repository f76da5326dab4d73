use crate::config::{Config, RustEnv};
use log::{LevelFilter, SetLoggerError};
use simplelog::{self, ColorChoice, ConfigBuilder, TerminalMode};

/// Noisy dependencies whose records are dropped unless running at Trace.
const FILTERED_MODULES: &[&str] = &[
    "sqlx",
    "sea_orm",
    "tower",
    "tower_sessions",
    "tower_sessions_core",
    "axum_login",
    "hyper",
    "axum",
];

pub struct Logger {}

impl Logger {
    /// Installs the global terminal logger at the configured level.
    ///
    /// Production output is never colored so log collectors get plain text.
    pub fn init_logger(config: &Config) -> Result<(), SetLoggerError> {
        let level = config.log_level_filter;
        let log_config = Self::build_log_config(Self::should_filter_dependencies(level));

        simplelog::TermLogger::init(
            Self::convert_level_filter(level),
            log_config,
            TerminalMode::Mixed,
            Self::color_choice(&config.runtime_env),
        )
    }

    fn convert_level_filter(level: LevelFilter) -> simplelog::LevelFilter {
        match level {
            LevelFilter::Off => simplelog::LevelFilter::Off,
            LevelFilter::Error => simplelog::LevelFilter::Error,
            LevelFilter::Warn => simplelog::LevelFilter::Warn,
            LevelFilter::Info => simplelog::LevelFilter::Info,
            LevelFilter::Debug => simplelog::LevelFilter::Debug,
            LevelFilter::Trace => simplelog::LevelFilter::Trace,
        }
    }

    fn should_filter_dependencies(level: LevelFilter) -> bool {
        level != LevelFilter::Trace
    }

    fn color_choice(runtime_env: &RustEnv) -> ColorChoice {
        match runtime_env {
            RustEnv::Production => ColorChoice::Never,
            RustEnv::Development | RustEnv::Staging => ColorChoice::Auto,
        }
    }

    fn build_log_config(apply_filters: bool) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        if apply_filters {
            for module in FILTERED_MODULES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_and_auth_layers_are_filtered() {
        for module in ["sqlx", "sea_orm", "tower_sessions", "axum_login"] {
            assert!(
                FILTERED_MODULES.contains(&module),
                "{module} should be filtered"
            );
        }
    }

    #[test]
    fn only_trace_shows_dependency_logs() {
        assert!(!Logger::should_filter_dependencies(LevelFilter::Trace));
        for level in [
            LevelFilter::Off,
            LevelFilter::Error,
            LevelFilter::Warn,
            LevelFilter::Info,
            LevelFilter::Debug,
        ] {
            assert!(Logger::should_filter_dependencies(level));
        }
    }

    #[test]
    fn production_output_is_not_colored() {
        assert!(matches!(
            Logger::color_choice(&RustEnv::Production),
            ColorChoice::Never
        ));
        assert!(matches!(
            Logger::color_choice(&RustEnv::Development),
            ColorChoice::Auto
        ));
    }

    #[test]
    fn convert_level_filter_keeps_the_level() {
        assert_eq!(
            Logger::convert_level_filter(LevelFilter::Warn) as u8,
            simplelog::LevelFilter::Warn as u8
        );
        assert_eq!(
            Logger::convert_level_filter(LevelFilter::Trace) as u8,
            simplelog::LevelFilter::Trace as u8
        );
    }

    #[test]
    fn build_log_config_with_and_without_filters() {
        let _filtered = Logger::build_log_config(true);
        let _unfiltered = Logger::build_log_config(false);
    }
}
