/*! Classify decoded Inmarsat Aero signal-unit bytes and publish records (§6).

```no_run
$ aero-parse -r units.bin -o records --udp-sink 239.1.2.3:5000
$ aero-parse --is-c -o records < units.bin
```
*/
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use aero_core::config::ParserOpt;
use aero_core::graph::{Graph, GraphRunner};
use aero_core::io_blocks::ByteSource;
use aero_core::parser::ParserBlock;
use aero_core::stream::{new_nocopy_stream, new_stream};

#[derive(Parser, Debug)]
#[command(version, about = "Classify decoded Inmarsat Aero signal-unit bytes and publish records")]
struct Opt {
    #[command(flatten)]
    parser: ParserOpt,

    /// Verbosity (repeat for more detail).
    #[arg(short = 'v', long = "verbose", default_value_t = 0)]
    verbose: usize,

    /// Read decoded bytes from this file; stdin when omitted.
    #[arg(short = 'r', long = "read")]
    read: Option<PathBuf>,

    /// Directory non-suppressed records are written under.
    #[arg(short = 'o', long = "out", default_value = ".")]
    out: PathBuf,
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

    let (byte_tx, byte_rx) = new_stream::<u8>();
    let source = ByteSource::<u8>::new(opt.read.as_deref(), 1 << 16, byte_tx)?;
    g.add(Box::new(source));

    let (rec_tx, _rec_rx) = new_nocopy_stream();
    let parser = ParserBlock::new(&opt.parser, opt.out, byte_rx, rec_tx)?;
    g.add(Box::new(parser));

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
