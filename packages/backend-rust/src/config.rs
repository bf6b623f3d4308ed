use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::fmt::Display;
use std::str::FromStr;

use bkt_algo::{clamp, is_invalid, BktParams, EngineConfig, EstimatorConfig, TargetRange};

#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// `EnvFilter` directives, from `RUST_LOG`
    pub filter: String,
    pub file_logs: bool,
    pub log_dir: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            file_logs: false,
            log_dir: PathBuf::from("./logs"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log: LogConfig,
    /// Per-skill parameter table, consulted before the defaults
    pub params_json: Option<PathBuf>,
    pub default_params: BktParams,
    pub engine: EngineConfig,
    /// Values that were rejected or clamped while reading the environment
    pub warnings: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8001,
            log: LogConfig::default(),
            params_json: None,
            default_params: BktParams::default(),
            engine: EngineConfig::default(),
            warnings: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup
    ///
    /// Unparseable or non-finite values keep their defaults and numeric values
    /// outside their domain are clamped; each such case is recorded in
    /// `warnings` so it can be logged once tracing is up.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut env = EnvReader {
            lookup,
            warnings: Vec::new(),
        };
        let defaults = Self::default();

        let port = env.parse_or("PORT", defaults.port);
        let host = env.parse_or("HOST", defaults.host);
        let log = LogConfig {
            filter: env.raw("RUST_LOG").unwrap_or(defaults.log.filter),
            file_logs: env.raw("ENABLE_FILE_LOGS").is_some_and(|v| v == "true" || v == "1"),
            log_dir: env.raw("LOG_DIR").map(PathBuf::from).unwrap_or(defaults.log.log_dir),
        };
        let params_json = env.raw("BKT_PARAMS_JSON").map(PathBuf::from);

        let base = BktParams::default();
        let default_params = BktParams::new(
            env.unit("BKT_T", base.transition),
            env.unit("BKT_G", base.guess),
            env.unit("BKT_S", base.slip),
            env.unit("BKT_PRIOR", base.prior),
        );

        let est = EstimatorConfig::default();
        let estimator = EstimatorConfig {
            related_weight: env.unit("BKT_RELATED_WEIGHT", est.related_weight),
            time_weight: env.unit("BKT_TIME_WEIGHT", est.time_weight),
            time_saturation_secs: env.bounded("BKT_TIME_SATURATION_SECS", est.time_saturation_secs, 1.0, f64::MAX),
            progress_weight: env.unit("BKT_PROGRESS_WEIGHT", est.progress_weight),
            lesson_warmup_attempts: env.parse_or("BKT_LESSON_WARMUP_ATTEMPTS", est.lesson_warmup_attempts),
        };

        let engine_defaults = EngineConfig::default();
        let target_range = TargetRange::new(
            env.unit("BKT_TARGET_LOW", engine_defaults.target_range.low),
            env.unit("BKT_TARGET_HIGH", engine_defaults.target_range.high),
        );
        let difficulty_scale =
            env.bounded("BKT_DIFFICULTY_SCALE", engine_defaults.difficulty_scale, 0.0, f64::MAX);

        Self {
            host,
            port,
            log,
            params_json,
            default_params,
            engine: EngineConfig {
                estimator,
                difficulty_scale,
                target_range,
            },
            warnings: env.warnings,
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

struct EnvReader<F> {
    lookup: F,
    warnings: Vec<String>,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn raw(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_or<T>(&mut self, key: &str, default: T) -> T
    where
        T: FromStr + Display,
    {
        let Some(raw) = self.raw(key) else {
            return default;
        };
        match raw.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                self.warnings
                    .push(format!("{key}={raw:?} is not valid, using default {default}"));
                default
            }
        }
    }

    /// Finite float within `[low, high]`
    fn bounded(&mut self, key: &str, default: f64, low: f64, high: f64) -> f64 {
        let Some(raw) = self.raw(key) else {
            return default;
        };
        match raw.parse::<f64>() {
            Ok(value) if !is_invalid(value) => {
                if (low..=high).contains(&value) {
                    value
                } else {
                    let clamped = clamp(value, low, high);
                    self.warnings
                        .push(format!("{key}={raw:?} is out of range, using {clamped}"));
                    clamped
                }
            }
            _ => {
                self.warnings.push(format!(
                    "{key}={raw:?} is not a finite number, using default {default}"
                ));
                default
            }
        }
    }

    fn unit(&mut self, key: &str, default: f64) -> f64 {
        self.bounded(key, default, 0.0, 1.0)
    }
}
