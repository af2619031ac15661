//! A [`Graph`] owns a set of blocks and drives them to completion.
//!
//! Blocks are wired together by passing the `ReadStream`/`NCReadStream`
//! handle returned from one block's constructor into the next, so the graph
//! itself does not need a port-registry: it just needs to call `work()` on
//! every block in a loop until nothing happens anymore.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::debug;

use crate::Result;
use crate::block::{Block, BlockRet};

/// A cheaply cloneable flag that lets external code (e.g. a Ctrl-C handler)
/// ask a running [`Graph`] to stop at the next frame boundary.
#[derive(Clone)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Trait implemented by graph runners, so callers don't need to care
/// whether they're driving a single-threaded or multithreaded scheduler.
pub trait GraphRunner {
    /// Add a block to the graph.
    fn add(&mut self, b: Box<dyn Block>);

    /// Run the graph until every block reports it is done.
    fn run(&mut self) -> Result<()>;

    /// A token that, when cancelled, makes `run()` return at the next
    /// frame boundary.
    fn cancel_token(&self) -> CancellationToken;

    /// Human readable per-block timing stats, valid after `run()` returns.
    fn generate_stats(&self) -> Result<String>;
}

struct BlockStats {
    name: String,
    calls: u64,
    time: Duration,
}

/// Single-threaded graph runner.
///
/// Matches the Aero core's concurrency model (§5): the decoder and parser
/// are each one cooperative loop, so there is no need for the multithreaded
/// scheduler this framework also offers elsewhere.
pub struct Graph {
    blocks: Vec<Box<dyn Block>>,
    stats: Vec<BlockStats>,
    cancel: CancellationToken,
}

impl Graph {
    /// Create a new, empty graph.
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            stats: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphRunner for Graph {
    fn add(&mut self, b: Box<dyn Block>) {
        self.stats.push(BlockStats {
            name: b.block_name().to_string(),
            calls: 0,
            time: Duration::ZERO,
        });
        self.blocks.push(b);
    }

    fn run(&mut self) -> Result<()> {
        loop {
            if self.cancel.is_cancelled() {
                debug!("Graph cancelled");
                return Ok(());
            }
            let mut progress = false;
            let mut all_done = true;
            for (n, b) in self.blocks.iter_mut().enumerate() {
                let st = Instant::now();
                let ret = b.work()?;
                self.stats[n].calls += 1;
                self.stats[n].time += st.elapsed();
                match ret {
                    BlockRet::Ok | BlockRet::Again => {
                        progress = true;
                        all_done = false;
                    }
                    BlockRet::Noop => {
                        all_done = false;
                    }
                    BlockRet::EOF => {}
                }
            }
            if all_done {
                return Ok(());
            }
            if !progress {
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    }

    fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn generate_stats(&self) -> Result<String> {
        let mut s = String::new();
        for st in &self.stats {
            s += &format!("{}: {} calls, {:?}\n", st.name, st.calls, st.time);
        }
        Ok(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockName;
    use crate::stream::{ReadStream, WriteStream, new_stream};

    struct CountingSource {
        dst: WriteStream<u8>,
        remaining: usize,
    }
    impl BlockName for CountingSource {
        fn block_name(&self) -> &str {
            "CountingSource"
        }
    }
    impl Block for CountingSource {
        fn work(&mut self) -> Result<BlockRet> {
            if self.remaining == 0 {
                self.dst.set_eof();
                return Ok(BlockRet::EOF);
            }
            self.dst.push(&[self.remaining as u8], &[]);
            self.remaining -= 1;
            Ok(BlockRet::Ok)
        }
    }

    struct Sink {
        src: ReadStream<u8>,
        total: usize,
    }
    impl BlockName for Sink {
        fn block_name(&self) -> &str {
            "Sink"
        }
    }
    impl Block for Sink {
        fn work(&mut self) -> Result<BlockRet> {
            let n = self.src.available();
            if n == 0 {
                return Ok(if self.src.eof() {
                    BlockRet::EOF
                } else {
                    BlockRet::Noop
                });
            }
            self.total += n;
            self.src.consume(n);
            Ok(BlockRet::Ok)
        }
    }

    #[test]
    fn runs_to_completion() {
        let (w, r) = new_stream::<u8>();
        let src = CountingSource {
            dst: w,
            remaining: 5,
        };
        let sink = Sink { src: r, total: 0 };
        let mut g = Graph::new();
        g.add(Box::new(src));
        g.add(Box::new(sink));
        g.run().unwrap();
        assert!(g.generate_stats().unwrap().contains("CountingSource"));
    }

    #[test]
    fn cancel_stops_early() {
        struct Forever;
        impl BlockName for Forever {
            fn block_name(&self) -> &str {
                "Forever"
            }
        }
        impl Block for Forever {
            fn work(&mut self) -> Result<BlockRet> {
                Ok(BlockRet::Noop)
            }
        }
        let mut g = Graph::new();
        g.add(Box::new(Forever));
        let cancel = g.cancel_token();
        cancel.cancel();
        g.run().unwrap();
    }
}
