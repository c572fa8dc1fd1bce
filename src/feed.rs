//! one-shot feeds of samples from a producer to the collector.
//!
//! a feed carries a known number of records. its sender is dropped after the last record, and
//! that is the only end-of-stream signal the collector observes.

use {crate::Error, tokio::sync::mpsc};

/// the number of records a feed buffers before its producer must wait.
pub const FEED_CAPACITY: usize = 4;

/// the sending half of a feed.
#[derive(Debug)]
pub struct Emitter<T> {
    tx: mpsc::Sender<T>,
    /// which metric this feed carries, for diagnostics.
    what: &'static str,
}

/// the receiving half of a feed.
#[derive(Debug)]
pub struct Feed<T> {
    rx: Option<mpsc::Receiver<T>>,
    /// the number of records this feed will yield.
    expected: usize,
    /// the number of records yielded so far.
    received: usize,
}

/// returns a bounded feed of `expected` records.
pub fn channel<T>(what: &'static str, expected: usize) -> (Emitter<T>, Feed<T>) {
    let (tx, rx) = mpsc::channel(FEED_CAPACITY);
    let emitter = Emitter { tx, what };
    let feed = Feed {
        rx: Some(rx),
        expected,
        received: 0,
    };
    (emitter, feed)
}

// === impl Emitter ===

impl<T> Emitter<T> {
    /// sends a record, waiting while the feed is full.
    pub async fn emit(&self, record: T) -> Result<(), Error> {
        let Self { tx, what } = self;
        tx.send(record)
            .await
            .map_err(|_| Error::Transport { what: *what })
    }
}

// === impl Feed ===

impl<T> Feed<T> {
    /// returns a feed that is already closed.
    pub fn closed() -> Self {
        Self {
            rx: None,
            expected: 0,
            received: 0,
        }
    }

    /// returns the next record.
    ///
    /// this returns `None` once the expected number of records has been read, or when the
    /// producer hung up. it never waits past the end of the stream.
    pub async fn next(&mut self) -> Option<T> {
        if self.is_done() {
            return None;
        }

        let rx = self.rx.as_mut()?;
        match rx.recv().await {
            Some(record) => {
                self.received += 1;
                if self.received == self.expected {
                    self.rx = None;
                }
                Some(record)
            }
            None => {
                self.rx = None;
                None
            }
        }
    }

    /// returns true once this feed will yield nothing more.
    pub fn is_done(&self) -> bool {
        self.rx.is_none() || self.received >= self.expected
    }

    /// returns true if this feed yielded every record it promised.
    #[cfg(test)]
    pub(crate) fn is_complete(&self) -> bool {
        self.received == self.expected
    }

    #[cfg(test)]
    pub(crate) fn received(&self) -> usize {
        self.received
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn yields_in_order_then_ends() {
        let (tx, mut feed) = channel("test", 3);
        tokio::spawn(async move {
            for i in 0..3 {
                tx.emit(i).await.unwrap();
            }
        });

        assert_eq!(feed.next().await, Some(0));
        assert_eq!(feed.next().await, Some(1));
        assert_eq!(feed.next().await, Some(2));
        assert_eq!(feed.next().await, None);
        assert!(feed.is_done());
        assert!(feed.is_complete());
    }

    /// the feed never reads more than it was promised, even if the producer misbehaves.
    #[tokio::test]
    async fn never_reads_past_expected() {
        let (tx, mut feed) = channel("test", 2);
        for i in 0..3 {
            tx.emit(i).await.unwrap();
        }

        assert_eq!(feed.next().await, Some(0));
        assert_eq!(feed.next().await, Some(1));
        assert_eq!(feed.next().await, None);
        assert_eq!(feed.received(), 2);

        // the receiver is gone, so the producer notices.
        assert!(matches!(tx.emit(3).await, Err(Error::Transport { what: "test" })));
    }

    #[tokio::test]
    async fn early_hangup() {
        let (tx, mut feed) = channel("test", 5);
        tx.emit(1).await.unwrap();
        drop(tx);

        assert_eq!(feed.next().await, Some(1));
        assert_eq!(feed.next().await, None);
        assert!(feed.is_done());
        assert!(!feed.is_complete());
    }

    #[tokio::test]
    async fn closed_feed_does_not_block() {
        let mut feed = Feed::<u16>::closed();
        assert!(feed.is_done());
        assert_eq!(feed.next().await, None);
    }

    /// a full feed applies backpressure to its producer.
    #[tokio::test(start_paused = true)]
    async fn full_feed_waits() {
        let (tx, mut feed) = channel("test", FEED_CAPACITY + 1);
        for i in 0..FEED_CAPACITY {
            tx.emit(i).await.unwrap();
        }

        let send = tx.emit(FEED_CAPACITY);
        tokio::pin!(send);
        let blocked = tokio::time::timeout(std::time::Duration::from_secs(1), &mut send).await;
        assert!(blocked.is_err());

        assert_eq!(feed.next().await, Some(0));
        send.await.unwrap();
    }
}
