/*! Decode Inmarsat Aero soft symbols into signal-unit bytes (§6).

```no_run
$ aero-decode -r samples.s8 --oqpsk --inter-cols 32 --inter-blocks 2 -o units.bin
$ aero-decode --is-c --dummy-bits 5 -v 2 < samples.s8 > units.bin
```
*/
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use aero_core::config::DecoderOpt;
use aero_core::decoder::DecoderBlock;
use aero_core::graph::{Graph, GraphRunner};
use aero_core::io_blocks::{ByteSink, ByteSource};
use aero_core::stream::new_stream;

#[derive(Parser, Debug)]
#[command(version, about = "Decode Inmarsat Aero soft symbols into signal-unit bytes")]
struct Opt {
    #[command(flatten)]
    decoder: DecoderOpt,

    /// Verbosity (repeat for more detail).
    #[arg(short = 'v', long = "verbose", default_value_t = 0)]
    verbose: usize,

    /// Read soft symbols from this file; stdin when omitted.
    #[arg(short = 'r', long = "read")]
    read: Option<PathBuf>,

    /// Write decoded bytes to this file; stdout when omitted.
    #[arg(short = 'o', long = "out")]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let opt = Opt::parse();
    stderrlog::new()
        .module(module_path!())
        .module("aero_core")
        .quiet(false)
        .verbosity(opt.verbose)
        .timestamp(stderrlog::Timestamp::Second)
        .init()?;

    let mut g: Box<dyn GraphRunner> = Box::new(Graph::new());

    let (sym_tx, sym_rx) = new_stream::<i8>();
    let source = ByteSource::<i8>::new(opt.read.as_deref(), 1 << 16, sym_tx)?;
    g.add(Box::new(source));

    let (byte_tx, byte_rx) = new_stream::<u8>();
    let decoder = DecoderBlock::new(&opt.decoder, sym_rx, byte_tx);
    g.add(Box::new(decoder));

    let sink = ByteSink::<u8>::new(opt.out.as_deref(), byte_rx)?;
    g.add(Box::new(sink));

    let cancel = g.cancel_token();
    ctrlc::set_handler(move || {
        eprintln!("Received Ctrl+C!");
        cancel.cancel();
    })?;

    eprintln!("Running…");
    g.run()?;
    eprintln!("{}", g.generate_stats()?);
    Ok(())
}
