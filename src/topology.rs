//! core count and frequency.

use {
    crate::{
        Error,
        canvas::Canvas,
        source::{ReadError, Source},
    },
    std::io::{self, BufRead, BufReader, Read, Write},
    tracing::{debug, warn},
};

/// the processor topology, fetched once.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoreTopology {
    pub cores: usize,
    pub max_freq_ghz: f64,
}

/// the columns between the left edges of neighboring core boxes.
const BOX_STRIDE_COLS: u16 = 8;
/// the rows between the top edges of neighboring core boxes.
const BOX_STRIDE_ROWS: u16 = 5;

// === impl CoreTopology ===

impl CoreTopology {
    /// fetches the core count and maximum frequency, in parallel.
    ///
    /// a missing frequency is reported as zero. a missing core count is fatal.
    pub async fn fetch<C, F>(cpuinfo: C, max_freq: F) -> Result<Self, Error>
    where
        C: Source + Send + 'static,
        F: Source + Send + 'static,
    {
        let cores = tokio::task::spawn_blocking(move || count_cores(&cpuinfo));
        let freq = tokio::task::spawn_blocking(move || max_freq_ghz(&max_freq));
        let (cores, freq) = tokio::join!(cores, freq);

        let cores = cores?.map_err(Error::reading("core count"))?;
        let max_freq_ghz = freq?.unwrap_or_else(|error| {
            warn!(%error, "maximum frequency is unavailable");
            0.0
        });

        debug!(cores, max_freq_ghz, "fetched core topology");
        Ok(Self {
            cores,
            max_freq_ghz,
        })
    }

    /// draws the summary label, and one box per core below it.
    pub fn draw<W: Write>(&self, canvas: &mut Canvas<W>, row: u16) -> io::Result<u16> {
        let Self {
            cores,
            max_freq_ghz,
        } = *self;

        let label = format!("Number of Cores: {cores} @ {max_freq_ghz:.2} GHz");
        canvas.text(row - 2, 1, &label)?;

        let mut bottom = row;
        for (grid_row, grid_col) in grid(cores) {
            let top = row + BOX_STRIDE_ROWS * grid_row;
            canvas.draw_core(top, 1 + BOX_STRIDE_COLS * grid_col)?;
            bottom = top + 2;
        }

        canvas.present()?;
        Ok(bottom)
    }
}

/// counts the logical processors listed by `source`.
pub fn count_cores(source: &impl Source) -> Result<usize, ReadError> {
    let reader = source.open().map(BufReader::new)?;

    let mut cores = 0;
    for line in reader.lines() {
        if line?.contains("processor") {
            cores += 1;
        }
    }

    Ok(cores)
}

/// reads a frequency in kHz from `source`, in GHz.
pub fn max_freq_ghz(source: &impl Source) -> Result<f64, ReadError> {
    let mut khz = String::new();
    source.open()?.read_to_string(&mut khz)?;
    let khz = khz.trim().parse::<u64>()?;

    Ok(khz as f64 / 1_000_000.0)
}

/// returns the `(row, col)` grid position of each core.
///
/// each row holds `floor(sqrt(cores))` boxes.
pub fn grid(cores: usize) -> impl Iterator<Item = (u16, u16)> {
    let width = cores.isqrt().max(1);
    (0..cores).map(move |i| {
        let (row, col) = (i / width, i % width);
        (row as u16, col as u16)
    })
}
