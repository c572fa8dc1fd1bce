use {
    crate::source::{ReadError, Source},
    std::{
        io::{BufRead, BufReader},
        num::ParseIntError,
        ops::Not,
        str::FromStr,
    },
};

pub use self::{
    cpu_time::{CpuSnapshot, CpuTime},
    user_hz::UserHz,
};

mod cpu_time;
mod user_hz;


/// an entry in the `/proc/stat` kernel statistics table.
///
/// see `proc_stat(5)` for more information. only cpu lines are interpreted, every other kind of
/// line is kept as [`Entry::Other`].
#[derive(Debug, Eq, PartialEq)]
pub enum Entry {
    /// the amount of time that the system ("cpu" line) spent in various states.
    AllCpu { time: CpuTime },
    /// the amount of time that a specific cpu ("cpuN" line) spent in various states.
    Cpu { id: CpuId, time: CpuTime },
    /// paging, interrupts, context switches, and the like.
    Other { kind: String },
}

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct CpuId(u16);

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum EntryParseError {
    #[error("empty entry")]
    Empty,
    #[error("invalid cpu id: {0}")]
    CpuIdParse(ParseIntError),
    #[error("invalid time value: {0}")]
    UserHzParse(ParseIntError),
    #[error("expected between {} and {} cpu times, found {count}", CpuTime::MIN_FIELDS, CpuTime::FIELDS)]
    CpuTime { count: usize },
}

// === impl CpuSnapshot ===

impl CpuSnapshot {
    /// uses the given source to read the system-wide cpu counters.
    ///
    /// the aggregate "cpu" line leads the table, so reading stops as soon as it is found.
    pub fn read(stats: &impl Source) -> Result<Self, ReadError> {
        let reader = stats.open().map(BufReader::new)?;

        for line in reader.lines() {
            if let Entry::AllCpu { time } = line?.parse::<Entry>()? {
                return Ok(Self::from(&time));
            }
        }

        Err(ReadError::Missing {
            what: "aggregate cpu line",
        })
    }
}

// === impl Entry ===

impl FromStr for Entry {
    type Err = EntryParseError;
    fn from_str(entry: &str) -> Result<Self, Self::Err> {
        let tokens = entry
            .split(' ')
            .filter(|t| t.is_empty().not())
            .collect::<Vec<_>>();
        let [kind, tokens @ ..] = tokens.as_slice() else {
            return Err(EntryParseError::Empty);
        };

        if kind.starts_with("cpu").not() {
            return Ok(Self::Other {
                kind: (*kind).to_owned(),
            });
        }

        let id = Self::parse_cpu_id(kind)?;
        let time = tokens
            .iter()
            .map(|t| t.parse::<UserHz>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(EntryParseError::UserHzParse)
            .and_then(CpuTime::try_from)?;

        Ok(if let Some(id) = id {
            Self::Cpu { id, time }
        } else {
            Self::AllCpu { time }
        })
    }
}

impl Entry {
    fn parse_cpu_id(token: &str) -> Result<Option<CpuId>, EntryParseError> {
        // strip the token of its "cpu" prefix.
        let suffix = token.strip_prefix("cpu").unwrap_or(token);

        // if there is no suffix, this is the aggregate line.
        if suffix.is_empty() {
            return Ok(None);
        }

        suffix
            .parse::<u16>()
            .map(CpuId)
            .map(Some)
            .map_err(EntryParseError::CpuIdParse)
    }
}
