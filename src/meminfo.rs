//! memory totals, read from `/proc/meminfo`.

use {
    crate::source::{ReadError, Source},
    std::{
        io::{BufRead, BufReader},
        num::ParseIntError,
        str::FromStr,
    },
};

/// total and free memory, in bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MemInfo {
    pub total: u64,
    pub free: u64,
}

/// one `Key:   value kB` line.
#[derive(Debug, Eq, PartialEq)]
struct Field<'a> {
    key: &'a str,
    bytes: u64,
}

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum MemInfoParseError {
    #[error("malformed meminfo line: {line}")]
    Malformed { line: String },
    #[error("invalid meminfo value: {0}")]
    Value(ParseIntError),
}

// === impl MemInfo ===

impl MemInfo {
    /// uses the given source to read the memory totals.
    pub fn read(source: &impl Source) -> Result<Self, ReadError> {
        let reader = source.open().map(BufReader::new)?;
        Self::parse(reader)
    }

    fn parse(reader: impl BufRead) -> Result<Self, ReadError> {
        let (mut total, mut free) = (None, None);
        for line in reader.lines() {
            let line = line?;
            let Field { key, bytes } = Field::parse(&line)?;
            match key {
                "MemTotal" => total = Some(bytes),
                "MemFree" => free = Some(bytes),
                _ => {}
            }
            if let (Some(total), Some(free)) = (total, free) {
                return Ok(Self { total, free });
            }
        }

        Err(ReadError::Missing {
            what: "MemTotal and MemFree",
        })
    }

    /// returns the number of bytes in use.
    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.free)
    }
}

impl FromStr for MemInfo {
    type Err = ReadError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.as_bytes())
    }
}

// === impl Field ===

impl<'a> Field<'a> {
    fn parse(line: &'a str) -> Result<Self, MemInfoParseError> {
        let malformed = || MemInfoParseError::Malformed {
            line: line.to_owned(),
        };

        let (key, rest) = line.split_once(':').ok_or_else(malformed)?;
        let mut tokens = rest.split_whitespace();
        let value = tokens
            .next()
            .ok_or_else(malformed)?
            .parse::<u64>()
            .map_err(MemInfoParseError::Value)?;

        let bytes = match tokens.next() {
            Some("kB") => value.saturating_mul(1024),
            None => value,
            Some(_) => return Err(malformed()),
        };

        Ok(Self { key, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMINFO: &str = "\
MemTotal:       16318360 kB
MemFree:         8159180 kB
MemAvailable:   12000000 kB
HugePages_Total:       0
";

    #[test]
    fn totals() {
        let info = MEMINFO.parse::<MemInfo>().unwrap();
        assert_eq!(info.total, 16318360 * 1024);
        assert_eq!(info.free, 8159180 * 1024);
        assert_eq!(info.used(), (16318360 - 8159180) * 1024);
    }

    #[test]
    fn unitless_field() {
        let field = Field::parse("HugePages_Total:       7").unwrap();
        assert_eq!(field, Field { key: "HugePages_Total", bytes: 7 });
    }

    #[test]
    fn malformed_line() {
        let err = Field::parse("MemTotal 1 kB").unwrap_err();
        assert!(matches!(err, MemInfoParseError::Malformed { .. }));
    }

    #[test]
    fn bad_value() {
        let err = Field::parse("MemTotal: lots kB").unwrap_err();
        assert!(matches!(err, MemInfoParseError::Value(_)));
    }

    #[test]
    fn missing_free() {
        let err = "MemTotal: 1 kB\n".parse::<MemInfo>().unwrap_err();
        assert!(matches!(err, ReadError::Missing { .. }));
    }

    /// a free count above the total never underflows.
    #[test]
    fn used_saturates() {
        let info = MemInfo { total: 1, free: 2 };
        assert_eq!(info.used(), 0);
    }
}
