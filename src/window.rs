use {
    super::*,
    crate::{
        canvas::Canvas,
        collector::{Collector, Counts, CtrlC, Interrupts, Outcome, Prompt},
        config::Metrics,
        feed::{self, Feed},
        meminfo::MemInfo,
        producer::{self, Schedule},
        scale::{self, CPU_Y, MEM_SCALE},
        sentinel::Sentinel,
        source::{CpuMaxFreq, ProcCpuInfo, ProcMemInfo, ProcStat, Source},
        topology::CoreTopology,
    },
    std::{io::Write, sync::Arc},
    tokio::{
        io::AsyncBufRead,
        signal::unix::{SignalKind, signal},
        task::{JoinSet, spawn_blocking},
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, info},
};

/// where each block of the dashboard is drawn.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Layout {
    /// the top row of the memory graph.
    pub memory_row: u16,
    /// the top row of the cpu graph.
    pub cpu_row: u16,
    /// the top row of the core boxes.
    pub cores_row: u16,
    /// a row below everything drawn, where the cursor rests.
    pub bottom: u16,
}

/// where each metric is read from.
#[derive(Debug, Default)]
pub struct Sources<M = ProcMemInfo, S = ProcStat, C = ProcCpuInfo, F = CpuMaxFreq> {
    pub meminfo: M,
    pub stat: S,
    pub cpuinfo: C,
    pub max_freq: F,
}

// === impl Layout ===

impl Layout {
    const TOP: u16 = 5;
    /// the rows between the top of the memory graph and the block below it.
    const MEMORY_BLOCK: u16 = 17;
    /// the rows between the top of the cpu graph and the block below it.
    const CPU_BLOCK: u16 = 16;

    /// stacks the enabled blocks from the top of the screen.
    pub fn new(metrics: Metrics) -> Self {
        let Metrics { memory, cpu, .. } = metrics;

        let memory_row = Self::TOP;
        let cpu_row = if memory {
            memory_row + Self::MEMORY_BLOCK
        } else {
            Self::TOP
        };
        let cores_row = if cpu {
            cpu_row + Self::CPU_BLOCK
        } else {
            cpu_row
        };

        let bottom = match (memory, cpu) {
            (_, true) => cpu_row + CPU_Y + 2,
            (true, false) => memory_row + MEM_SCALE + 2,
            (false, false) => Self::TOP,
        };

        Self {
            memory_row,
            cpu_row,
            cores_row,
            bottom,
        }
    }
}

// === impl App ===

impl App {
    /// returns a dashboard drawing to standard output.
    pub fn new(config: Config) -> Self {
        Self::with_canvas(config, Canvas::stdout())
    }

    /// runs the dashboard against the live system.
    ///
    /// `SIGINT` raises the exit prompt. `SIGTSTP` is ignored for as long as this runs.
    pub async fn run(mut self) -> Result<Outcome, Error> {
        let interrupts = CtrlC::install()?;
        let _suspend = signal(SignalKind::from_raw(libc::SIGTSTP))?;
        let sources: Sources = Sources::default();

        self.run_with(sources, interrupts, Prompt::stdin()).await
    }
}

impl<W: Write> App<W> {
    pub fn with_canvas(config: Config, canvas: Canvas<W>) -> Self {
        Self { config, canvas }
    }

    /// draws every enabled block, then samples until done or cancelled.
    pub async fn run_with<M, S, C, F, I, R>(
        &mut self,
        sources: Sources<M, S, C, F>,
        interrupts: I,
        prompt: Prompt<R>,
    ) -> Result<Outcome, Error>
    where
        M: Source + Send + Sync + 'static,
        S: Source + Default + Send + 'static,
        C: Source + Send + 'static,
        F: Source + Send + 'static,
        I: Interrupts,
        R: AsyncBufRead + Unpin,
    {
        let Self { config, canvas } = self;
        let Sources {
            meminfo,
            stat,
            cpuinfo,
            max_freq,
        } = sources;
        let Metrics {
            memory,
            cpu,
            cores,
        } = config.metrics;
        let mut layout = Layout::new(config.metrics);
        let width = u16::try_from(config.samples).unwrap_or(u16::MAX);

        info!(?config, "starting");
        canvas.clear()?;
        canvas.text(1, 1, &header(config))?;

        let meminfo = Arc::new(meminfo);
        let mut total_gb = 0.0;
        if memory {
            let source = Arc::clone(&meminfo);
            let total = spawn_blocking(move || MemInfo::read(&*source))
                .await?
                .map_err(Error::reading("memory"))?
                .total;
            total_gb = scale::bytes_to_gb(total);

            let row = layout.memory_row;
            let top_label = format!("{} GB", total_gb as u64);
            canvas.text(row - 2, 1, "v Memory")?;
            canvas.draw_axis(MEM_SCALE, width, "0 GB", &top_label, row)?;
        }
        if cpu {
            let row = layout.cpu_row;
            canvas.text(row - 2, 1, "v CPU")?;
            canvas.draw_axis(CPU_Y, width, "  0%", "100%", row)?;
        }
        canvas.park(layout.bottom)?;
        canvas.present()?;

        if cores {
            let topology = CoreTopology::fetch(cpuinfo, max_freq).await?;
            let bottom = topology.draw(canvas, layout.cores_row)?;
            layout.bottom = layout.bottom.max(bottom + 2);
            canvas.park(layout.bottom)?;
            canvas.present()?;
        }

        let outcome = if config.samples_graphs() {
            let cancel = CancellationToken::new();
            let mut tasks = JoinSet::new();

            let memory = if memory {
                let (emitter, feed) = feed::channel("memory", config.samples);
                let schedule = Schedule::new(config, cancel.clone());
                tasks.spawn(producer::memory(meminfo, schedule, emitter));
                feed
            } else {
                Feed::closed()
            };
            let cpu = if cpu {
                let (emitter, feed) = feed::channel("cpu", config.samples);
                let schedule = Schedule::new(config, cancel.clone());
                tasks.spawn(producer::cpu(Sentinel::with_source(stat), schedule, emitter));
                feed
            } else {
                Feed::closed()
            };

            let collector =
                Collector::new(canvas, layout, total_gb, interrupts, prompt, cancel.clone());
            let outcome = match collector.run(memory, cpu).await {
                Ok(outcome) => outcome,
                Err(error) => {
                    cancel.cancel();
                    return Err(error);
                }
            };

            while let Some(joined) = tasks.join_next().await {
                joined??;
            }
            if let Outcome::HungUp { what } = outcome {
                return Err(Error::Transport { what });
            }
            outcome
        } else {
            Outcome::Completed(Counts::default())
        };

        debug!(?outcome, "finished");
        if let Outcome::Cancelled = outcome {
            canvas.clear()?;
        } else {
            canvas.park(layout.bottom)?;
        }
        canvas.present()?;

        Ok(outcome)
    }
}

fn header(config: &Config) -> String {
    let Config {
        samples, interval, ..
    } = config;
    format!(
        "Nbr of samples: {samples} -- every {} microSecs ({:.3} secs)",
        interval.as_micros(),
        interval.as_secs_f64()
    )
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            canvas::{ORIGIN_COL, screen::Screen},
            source::MockSource,
        },
        std::{ops::RangeInclusive, time::Duration},
        tokio::sync::mpsc,
    };

    const MEMINFO: &str = "MemTotal: 16777216 kB\nMemFree: 8388608 kB\n";
    const CPUINFO: &str = "processor : 0\nprocessor : 1\nprocessor : 2\nprocessor : 3\n";
    const STAT: [&str; 4] = [
        "cpu 0 0 100 900 0 0 0 0 0 0",
        "cpu 0 0 200 1000 0 0 0 0 0 0",
        "cpu 0 0 300 1100 0 0 0 0 0 0",
        "cpu 0 0 400 1200 0 0 0 0 0 0",
    ];

    type Mocks = Sources<MockSource, MockSource, MockSource, MockSource>;

    /// the rows of the memory graph, when it is the top block.
    const MEMORY_ROWS: RangeInclusive<u16> = 5..=17;
    /// the rows of the cpu graph, below the memory graph.
    const CPU_ROWS: RangeInclusive<u16> = 22..=32;
    /// the columns right of the vertical axes, where points land.
    const PLOT_COLS: RangeInclusive<u16> = ORIGIN_COL + 1..=u16::MAX;

    fn config(samples: usize, metrics: Metrics) -> Config {
        Config {
            samples,
            interval: Duration::from_millis(100),
            metrics,
        }
    }

    fn app(config: Config) -> App<Vec<u8>> {
        App::with_canvas(config, Canvas::new(Vec::new()))
    }

    fn mocks(samples: usize) -> Mocks {
        Sources {
            meminfo: MockSource::repeat(MEMINFO, samples + 1),
            stat: MockSource::new(STAT),
            cpuinfo: MockSource::new([CPUINFO]),
            max_freq: MockSource::new(["2400000\n"]),
        }
    }

    fn only(memory: bool, cpu: bool, cores: bool) -> Metrics {
        Metrics { memory, cpu, cores }
    }

    #[test]
    fn every_block_stacks() {
        let layout = Layout::new(Metrics::ALL);
        assert_eq!((layout.memory_row, layout.cpu_row, layout.cores_row), (5, 22, 38));
    }

    #[test]
    fn blocks_move_up_when_disabled() {
        let rows = |metrics| {
            let Layout {
                memory_row,
                cpu_row,
                cores_row,
                ..
            } = Layout::new(metrics);
            (memory_row, cpu_row, cores_row)
        };
        assert_eq!(rows(only(true, false, true)).2, 22);
        assert_eq!(rows(only(false, true, true)), (5, 5, 21));
        assert_eq!(rows(only(false, false, true)).2, 5);
    }

    #[test]
    fn header_text() {
        assert_eq!(
            header(&Config::default()),
            "Nbr of samples: 20 -- every 500000 microSecs (0.500 secs)"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn full_dashboard() {
        let (_raise, interrupts) = mpsc::channel(1);
        let mut app = app(config(3, Metrics::ALL));
        let outcome = app
            .run_with(mocks(3), interrupts, Prompt::new(&b""[..]))
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Completed(Counts { memory: 3, cpu: 3 }));

        let screen = Screen::render(app.canvas.output());
        assert_eq!(
            screen.read(1, 1, 56),
            "Nbr of samples: 3 -- every 100000 microSecs (0.100 secs)"
        );
        assert_eq!(screen.read(3, 1, 16), "v Memory 8.00 GB");
        assert_eq!(screen.read(5, 1, 5), "16 GB");
        assert_eq!(
            screen.find_in('#', MEMORY_ROWS, PLOT_COLS),
            vec![(11, 9), (11, 10), (11, 11)]
        );
        assert_eq!(screen.read(20, 1, 5), "v CPU");
        assert_eq!(screen.read(20, 9, 8), " 50.00 %");
        assert_eq!(
            screen.find_in(':', CPU_ROWS, PLOT_COLS),
            vec![(27, 9), (27, 10), (27, 11)]
        );
        assert_eq!(screen.read(36, 1, 29), "Number of Cores: 4 @ 2.40 GHz");
        assert_eq!(screen.find('+').len(), 4 * 4);
    }

    /// a disabled cpu graph never holds up the end of the run.
    #[tokio::test(start_paused = true)]
    async fn memory_only() {
        let (_raise, interrupts) = mpsc::channel(1);
        let mut app = app(config(5, only(true, false, false)));
        let outcome = app
            .run_with(mocks(5), interrupts, Prompt::new(&b""[..]))
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Completed(Counts { memory: 5, cpu: 0 }));
        let screen = Screen::render(app.canvas.output());
        let points = screen.find('#');
        assert_eq!(points.len(), 5);
        assert!(points.iter().all(|(row, _)| MEMORY_ROWS.contains(row)));
        assert!(screen.find_in(':', CPU_ROWS, PLOT_COLS).is_empty());
        // only the header holds a colon.
        assert_eq!(screen.find(':'), vec![(1, 15)]);
    }

    #[tokio::test(start_paused = true)]
    async fn memory_failure_is_fatal() {
        let (_raise, interrupts) = mpsc::channel(1);
        let mut app = app(config(3, only(true, false, false)));
        let sources = Sources {
            meminfo: MockSource::repeat(MEMINFO, 2),
            ..mocks(3)
        };
        let err = app
            .run_with(sources, interrupts, Prompt::new(&b""[..]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Source { what: "memory", .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn confirmed_exit_clears_the_screen() {
        let (raise, interrupts) = mpsc::channel(1);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            raise.send(()).await.unwrap();
        });

        let mut app = app(config(10, only(true, false, false)));
        let outcome = app
            .run_with(mocks(10), interrupts, Prompt::new(&b"y\n"[..]))
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Cancelled);
        let screen = Screen::render(app.canvas.output());
        assert!(screen.find('#').is_empty());
        assert!(screen.find('|').is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cores_alone_samples_nothing() {
        let (_raise, interrupts) = mpsc::channel(1);
        let mut app = app(config(3, only(false, false, true)));
        let outcome = app
            .run_with(mocks(3), interrupts, Prompt::new(&b""[..]))
            .await
            .unwrap();

        assert_eq!(outcome, Outcome::Completed(Counts::default()));
        let screen = Screen::render(app.canvas.output());
        assert_eq!(screen.read(3, 1, 29), "Number of Cores: 4 @ 2.40 GHz");
        assert!(screen.find('|').len() >= 4);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_cpuinfo_is_fatal() {
        let (_raise, interrupts) = mpsc::channel(1);
        let mut app = app(config(3, only(false, false, true)));
        let sources = Sources {
            cpuinfo: MockSource::default(),
            ..mocks(3)
        };
        let err = app
            .run_with(sources, interrupts, Prompt::new(&b""[..]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Source { what: "core count", .. }));
    }
}
