//! the render loop.
//!
//! the collector waits on both feeds at once, and plots whichever record arrives first. an
//! interrupt suspends it on an exit prompt, while the producers keep sampling.

use {
    crate::{
        Error,
        canvas::Canvas,
        feed::Feed,
        producer::{CpuPercent, MemoryLevel},
        scale::{self, CPU_Y, MEM_SCALE},
        window::Layout,
    },
    crossterm::style::Stylize,
    std::io::{self, Write},
    tokio::{
        io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin},
        signal::unix::{Signal, SignalKind, signal},
        sync::mpsc,
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, info},
};

/// a stream of user interrupts.
pub trait Interrupts {
    /// waits for the next interrupt.
    ///
    /// `None` means no further interrupt will arrive.
    fn interrupted(&mut self) -> impl Future<Output = Option<()>>;
}

/// interrupts raised by `SIGINT`.
pub struct CtrlC(Signal);

/// asks whether to exit.
pub struct Prompt<R> {
    input: R,
}

/// plots records as they arrive.
pub struct Collector<'c, W, I, R> {
    canvas: &'c mut Canvas<W>,
    layout: Layout,
    /// total memory, for the memory label.
    total_gb: f64,
    interrupts: I,
    prompt: Prompt<R>,
    /// stops the producers.
    cancel: CancellationToken,
}

/// how the render loop ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// every enabled feed delivered all of its records.
    Completed(Counts),
    /// the user confirmed an exit.
    Cancelled,
    /// a feed hung up early. its producer holds the reason.
    HungUp { what: &'static str },
}

/// the number of points plotted on each graph.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Counts {
    pub memory: usize,
    pub cpu: usize,
}

// === impl CtrlC ===

impl CtrlC {
    /// starts listening for `SIGINT`.
    pub fn install() -> io::Result<Self> {
        signal(SignalKind::interrupt()).map(Self)
    }
}

impl Interrupts for CtrlC {
    fn interrupted(&mut self) -> impl Future<Output = Option<()>> {
        self.0.recv()
    }
}

impl Interrupts for mpsc::Receiver<()> {
    fn interrupted(&mut self) -> impl Future<Output = Option<()>> {
        self.recv()
    }
}

// === impl Prompt ===

impl Prompt<BufReader<Stdin>> {
    /// returns a prompt reading answers from standard input.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> Prompt<R> {
    const QUESTION: &'static str = "Do you want to exit? (y/n)";
    const ROW: u16 = 1;
    const COL: u16 = 70;

    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: AsyncBufRead + Unpin> Prompt<R> {
    /// asks whether to exit, and waits for an answer.
    ///
    /// blank lines are skipped. an answer starting with `y` or `Y` confirms, anything else
    /// declines and erases the question.
    pub async fn confirm_exit<W: Write>(&mut self, canvas: &mut Canvas<W>) -> Result<bool, Error> {
        canvas.text(Self::ROW, Self::COL, Self::QUESTION)?;
        canvas.present()?;

        let answer = loop {
            let mut line = String::new();
            if self.input.read_line(&mut line).await? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input closed while asking whether to exit",
                )
                .into());
            }
            if let Some(answer) = line.trim_start().chars().next() {
                break answer;
            }
        };

        let confirmed = matches!(answer, 'y' | 'Y');
        if !confirmed {
            let blank = " ".repeat(Self::QUESTION.len());
            canvas.text(Self::ROW, Self::COL, &blank)?;
            canvas.present()?;
        }

        Ok(confirmed)
    }
}

// === impl Collector ===

impl<'c, W, I, R> Collector<'c, W, I, R>
where
    W: Write,
    I: Interrupts,
    R: AsyncBufRead + Unpin,
{
    pub fn new(
        canvas: &'c mut Canvas<W>,
        layout: Layout,
        total_gb: f64,
        interrupts: I,
        prompt: Prompt<R>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            canvas,
            layout,
            total_gb,
            interrupts,
            prompt,
            cancel,
        }
    }

    /// plots records until both feeds are done.
    ///
    /// interrupts are checked first, then memory, then cpu, so a flood of records never starves
    /// the prompt.
    pub async fn run(
        mut self,
        mut memory: Feed<MemoryLevel>,
        mut cpu: Feed<CpuPercent>,
    ) -> Result<Outcome, Error> {
        let mut counts = Counts::default();

        while !(memory.is_done() && cpu.is_done()) {
            tokio::select! {
                biased;
                Some(()) = self.interrupts.interrupted() => {
                    info!("interrupted");
                    if self.prompt.confirm_exit(&mut *self.canvas).await? {
                        info!("exit confirmed");
                        self.cancel.cancel();
                        return Ok(Outcome::Cancelled);
                    }
                    debug!("exit declined");
                }
                level = memory.next(), if !memory.is_done() => match level {
                    Some(level) => {
                        counts.memory += 1;
                        self.plot_memory(counts.memory, level)?;
                    }
                    None => return Ok(self.hung_up("memory")),
                },
                percent = cpu.next(), if !cpu.is_done() => match percent {
                    Some(percent) => {
                        counts.cpu += 1;
                        self.plot_cpu(counts.cpu, percent)?;
                    }
                    None => return Ok(self.hung_up("cpu")),
                },
            }
        }

        debug!(?counts, "every feed is complete");
        Ok(Outcome::Completed(counts))
    }

    fn plot_memory(&mut self, sample: usize, MemoryLevel(level): MemoryLevel) -> io::Result<()> {
        let Self {
            canvas,
            layout,
            total_gb,
            ..
        } = self;
        let row = layout.memory_row;
        let gb = scale::memory_level_to_gb(level, *total_gb);

        canvas.draw_point(x(sample), level, MEM_SCALE, row, '#'.green())?;
        canvas.draw_label(row - 2, LABEL_COL, &format!(" {gb:.2} GB"))?;
        canvas.park(layout.bottom)?;
        canvas.present()
    }

    fn plot_cpu(&mut self, sample: usize, CpuPercent(percent): CpuPercent) -> io::Result<()> {
        let Self { canvas, layout, .. } = self;
        let row = layout.cpu_row;
        let level = scale::cpu_level(percent);

        canvas.draw_point(x(sample), level, CPU_Y, row, ':'.cyan())?;
        canvas.draw_label(row - 2, LABEL_COL, &format!(" {percent:.2} %"))?;
        canvas.park(layout.bottom)?;
        canvas.present()
    }

    /// stops the remaining producers after a feed closed early.
    fn hung_up(&self, what: &'static str) -> Outcome {
        debug!(what, "feed hung up early");
        self.cancel.cancel();
        Outcome::HungUp { what }
    }
}

/// the column of each graph's value label, just past its title.
///
/// the label text leads with a space, so it never runs into the title.
const LABEL_COL: u16 = 9;

/// returns the x coordinate of the `sample`th point.
fn x(sample: usize) -> u16 {
    u16::try_from(sample).unwrap_or(u16::MAX)
}
