//! command-line arguments.

use {
    crate::config::{Config, Metrics},
    clap::{ArgAction, CommandFactory, FromArgMatches, Parser, error::ErrorKind},
    std::{ffi::OsString, time::Duration},
};

/// the message printed for any malformed argument.
pub const USAGE_ERROR: &str = "wrong format of inputs, refer to readme";

/// a live terminal graph of memory, cpu, and core topology.
#[derive(Debug, Parser)]
#[command(name = "sysplot", version, about, long_about = None)]
pub struct Cli {
    /// number of samples to plot, or the delay when it follows `--samples=N`
    #[arg(value_name = "SAMPLES", value_parser = clap::value_parser!(u64).range(1..))]
    samples: Option<u64>,

    /// delay between samples, in microseconds
    #[arg(value_name = "TDELAY", value_parser = clap::value_parser!(u64).range(1..))]
    tdelay: Option<u64>,

    /// number of samples to plot
    #[arg(
        long = "samples",
        value_name = "N",
        require_equals = true,
        value_parser = clap::value_parser!(u32).range(1..),
    )]
    samples_flag: Option<u32>,

    /// delay between samples, in microseconds
    #[arg(
        long = "tdelay",
        value_name = "T",
        require_equals = true,
        conflicts_with = "tdelay",
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    tdelay_flag: Option<u64>,

    /// show memory utilization
    #[arg(long, action = ArgAction::Count)]
    memory: u8,

    /// show cpu utilization
    #[arg(long, action = ArgAction::Count)]
    cpu: u8,

    /// show the core count and maximum frequency
    #[arg(long, action = ArgAction::Count)]
    cores: u8,

    /// set when `--samples=N` precedes the first positional, which then holds the delay.
    #[arg(skip)]
    delay_follows_samples: bool,
}

// === impl Cli ===

impl Cli {
    /// parses `args`, and resolves them into a [`Config`].
    ///
    /// a positional that follows `--samples=N` is the delay, as in `--samples=5 100000`.
    pub fn try_config_from<I, T>(args: I) -> Result<Config, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        let mut cli = Self::from_arg_matches(&matches)?;
        cli.delay_follows_samples = matches!(
            (matches.index_of("samples_flag"), matches.index_of("samples")),
            (Some(flag), Some(positional)) if flag < positional
        );
        Config::try_from(cli)
    }
}

impl TryFrom<Cli> for Config {
    type Error = clap::Error;

    fn try_from(
        Cli {
            samples,
            tdelay,
            samples_flag,
            tdelay_flag,
            memory,
            cpu,
            cores,
            delay_follows_samples,
        }: Cli,
    ) -> Result<Self, Self::Error> {
        let memory = toggle("memory", memory)?;
        let cpu = toggle("cpu", cpu)?;
        let cores = toggle("cores", cores)?;

        let (samples, tdelay) = match (samples_flag, samples, tdelay) {
            (Some(n), Some(delay), None) if delay_follows_samples => {
                (Some(u64::from(n)), Some(delay))
            }
            (Some(_), Some(_), _) => return Err(conflict("samples")),
            (flag, positional, tdelay) => (positional.or(flag.map(u64::from)), tdelay),
        };
        if tdelay.is_some() && tdelay_flag.is_some() {
            return Err(conflict("tdelay"));
        }

        let samples = match samples {
            Some(n) => usize::try_from(n).map_err(|_| {
                clap::Error::raw(
                    ErrorKind::ValueValidation,
                    format!("'{n}' is too many samples\n"),
                )
            })?,
            None => Config::DEFAULT_SAMPLES,
        };
        let interval = tdelay
            .or(tdelay_flag)
            .map(Duration::from_micros)
            .unwrap_or(Config::DEFAULT_INTERVAL);

        Ok(Self {
            samples,
            interval,
            metrics: Metrics::from_toggles(memory, cpu, cores),
        })
    }
}

/// a setting may be given once, either by position or by name.
fn conflict(name: &str) -> clap::Error {
    clap::Error::raw(
        ErrorKind::ArgumentConflict,
        format!("'{}' was given both by position and as '--{name}='\n", name.to_uppercase()),
    )
}

/// a toggle may be given at most once.
fn toggle(name: &str, occurrences: u8) -> Result<bool, clap::Error> {
    match occurrences {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(clap::Error::raw(
            ErrorKind::ArgumentConflict,
            format!("the argument '--{name}' cannot be used multiple times\n"),
        )),
    }
}
