use std::{env, path::Path};

use log::LevelFilter;
use tsp_exact_derive::{CliOptions, CliValue, KvDisplay};

use crate::{Error, MAX_SOLVER_NODES, Result};

const DEFAULT_MIN_NODES: usize = 3;
const DEFAULT_MAX_NODES: usize = 20;

/// Runtime options for the `tsp-exact` binary.
#[derive(Clone, Debug, CliOptions, KvDisplay)]
pub struct SolverOptions {
    /// Numeric type used for matrix entries and tour distances. `auto` picks
    /// `float` when any matrix entry is fractional.
    #[cli(long = "cost-type", parse_with = "CostType::parse")]
    pub cost_type: CostType,
    /// Smallest accepted matrix dimension.
    #[cli(long = "min-nodes")]
    pub min_nodes: usize,
    /// Largest accepted matrix dimension. Table size grows as `n * 2^n`.
    #[cli(long = "max-nodes")]
    pub max_nodes: usize,
    /// Worker threads for batch requests. `0` uses every core.
    #[cli(long = "threads")]
    pub threads: usize,
    /// Accept negative edge costs.
    #[cli(long = "allow-negative", flag)]
    pub allow_negative: bool,
    /// Re-check every returned tour against its matrix before writing it.
    #[cli(long = "verify", flag)]
    pub verify: bool,
    /// Pretty-print the JSON response.
    #[cli(long = "pretty", flag)]
    pub pretty: bool,
    /// Structured logging level.
    #[cli(long = "log-level", parse_with = "LogLevel::parse")]
    pub log_level: LogLevel,
    /// Logging output format.
    #[cli(long = "log-format", parse_with = "LogFormat::parse")]
    pub log_format: LogFormat,
    /// Include timestamps in log lines.
    #[cli(long = "log-timestamp", flag)]
    pub log_timestamp: bool,
    /// Optional output file path for logs. Empty means stderr.
    #[cli(long = "log-output")]
    #[kv(debug)]
    pub log_output: String,
    /// Optional request file path. Empty means stdin.
    #[cli(long = "input")]
    #[kv(debug)]
    pub input: String,
    /// Optional response file path. Empty means stdout.
    #[cli(long = "output")]
    #[kv(debug)]
    pub output: String,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "cost-type")]
pub enum CostType {
    Auto,
    #[cli(alias = "integer", alias = "i64")]
    Int,
    #[cli(alias = "f64")]
    Float,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-level")]
pub enum LogLevel {
    Error,
    #[cli(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl LogLevel {
    pub fn to_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
            Self::Off => LevelFilter::Off,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-format")]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            cost_type: CostType::Auto,
            min_nodes: DEFAULT_MIN_NODES,
            max_nodes: DEFAULT_MAX_NODES,
            threads: 0,
            allow_negative: true,
            verify: false,
            pretty: false,
            log_level: LogLevel::Warn,
            log_format: LogFormat::Compact,
            log_timestamp: true,
            log_output: String::new(),
            input: String::new(),
            output: String::new(),
        }
    }
}

impl SolverOptions {
    pub fn from_args() -> Result<Self> {
        Self::parse_from_iter(env::args().skip(1))
    }

    fn parse_from_iter<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        let mut args = args
            .into_iter()
            .map(|arg| arg.as_ref().to_owned())
            .peekable();

        while let Some(arg) = args.next() {
            if arg == "--help" || arg == "-h" {
                return Err(Error::invalid_option(Self::usage()));
            }

            let Some(raw_name) = arg.strip_prefix("--") else {
                return Err(Error::invalid_option(format!(
                    "Unexpected argument: {arg}\n\n{}",
                    Self::usage()
                )));
            };

            if raw_name.is_empty() {
                return Err(Error::invalid_option(format!(
                    "Invalid option name: {arg}\n\n{}",
                    Self::usage()
                )));
            }

            let (name, value) = Self::split_arg(raw_name, &mut args);
            if !options.apply_cli_option(&name, value)? {
                return Err(Error::invalid_option(format!(
                    "Unknown option: --{name}\n\n{}",
                    Self::usage()
                )));
            }
        }

        options.check_limits()?;
        Ok(options)
    }

    fn check_limits(&self) -> Result<()> {
        if self.min_nodes == 0 {
            return Err(Error::invalid_option("--min-nodes must be at least 1"));
        }
        if self.max_nodes > MAX_SOLVER_NODES {
            return Err(Error::invalid_option(format!(
                "--max-nodes must be at most {MAX_SOLVER_NODES}"
            )));
        }
        if self.min_nodes > self.max_nodes {
            return Err(Error::invalid_option(format!(
                "--min-nodes ({}) exceeds --max-nodes ({})",
                self.min_nodes, self.max_nodes
            )));
        }
        Ok(())
    }

    pub fn usage() -> &'static str {
        concat!(
            "Usage:\n",
            "  tsp-exact [options] [--input request.json]\n",
            "  tsp-exact [options] < request.json\n\n",
            "Options:\n",
            "  --cost-type <auto|int|float>\n",
            "  --min-nodes <usize>\n",
            "  --max-nodes <usize>\n",
            "  --threads <usize>\n",
            "  --allow-negative[=<bool>]\n",
            "  --no-allow-negative\n",
            "  --verify[=<bool>]\n",
            "  --no-verify\n",
            "  --pretty[=<bool>]\n",
            "  --no-pretty\n",
            "  --log-level <error|warn|info|debug|trace|off>\n",
            "  --log-format <compact|pretty>\n",
            "  --log-timestamp[=<bool>]\n",
            "  --no-log-timestamp\n",
            "  --log-output <path>\n",
            "  --input <path>\n",
            "  --output <path>\n",
            "  --help\n",
            "\n",
            "Request:\n",
            "  {\"matrix\": [[0, 10, 15], [10, 0, 35], [15, 35, 0]]}\n",
            "  or a JSON array of such objects to solve several matrices at once.\n",
            "\n",
            "Examples:\n",
            "  tsp-exact --input request.json --pretty\n",
            "  tsp-exact --cost-type=float --log-level=info < request.json\n",
            "  tsp-exact --threads=4 --max-nodes=16 --output response.json < batch.json\n",
        )
    }

    pub fn log_output_path(&self) -> Option<&Path> {
        non_stdio_path(&self.log_output)
    }

    pub fn output_path(&self) -> Option<&Path> {
        non_stdio_path(&self.output)
    }

    pub fn input_path(&self) -> Option<&Path> {
        non_stdio_path(&self.input)
    }
}

/// Empty and `-` mean the matching standard stream.
fn non_stdio_path(raw: &str) -> Option<&Path> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "-" {
        None
    } else {
        Some(Path::new(raw))
    }
}
