//! Raw file/stdin/stdout sources and sinks for soft-symbol and decoded-byte
//! streams (§6), grounded in the framework's own `file_source.rs`/
//! `file_sink.rs`, generalized to this crate's `ReadStream`/`WriteStream`
//! plumbing and to either element type this crate streams (`i8` soft
//! symbols, `u8` decoded bytes).
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::{debug, warn};

use crate::Result;
use crate::block::{Block, BlockName, BlockRet};
use crate::stream::{ReadStream, WriteStream};

/// Converts a stream element to and from its single on-wire byte.
pub trait RawByte: Copy {
    /// Build an element from a raw byte.
    fn from_byte(b: u8) -> Self;
    /// Serialize an element back to its raw byte.
    fn to_byte(self) -> u8;
}

impl RawByte for i8 {
    fn from_byte(b: u8) -> Self {
        b as i8
    }
    fn to_byte(self) -> u8 {
        self as u8
    }
}

impl RawByte for u8 {
    fn from_byte(b: u8) -> Self {
        b
    }
    fn to_byte(self) -> u8 {
        self
    }
}

/// Reads raw bytes from a file (or stdin, when no path is given) and pushes
/// them onto a stream, one byte per element.
pub struct ByteSource<T: RawByte> {
    reader: Box<dyn Read>,
    chunk_bytes: usize,
    dst: WriteStream<T>,
}

impl<T: RawByte> ByteSource<T> {
    /// Open `path` for reading, or stdin when `path` is `None`. `chunk_elems`
    /// bounds how many elements are read and pushed per `work()` call.
    pub fn new(path: Option<&Path>, chunk_elems: usize, dst: WriteStream<T>) -> Result<Self> {
        let reader: Box<dyn Read> = match path {
            Some(p) => {
                debug!("opening source {}", p.display());
                Box::new(BufReader::new(std::fs::File::open(p)?))
            }
            None => {
                debug!("reading source from stdin");
                Box::new(std::io::stdin())
            }
        };
        Ok(Self {
            reader,
            chunk_bytes: chunk_elems.max(1),
            dst,
        })
    }
}

impl<T: RawByte> BlockName for ByteSource<T> {
    fn block_name(&self) -> &str {
        "ByteSource"
    }
}

impl<T: RawByte> Block for ByteSource<T> {
    fn work(&mut self) -> Result<BlockRet> {
        let mut buf = vec![0u8; self.chunk_bytes];
        let n = self.reader.read(&mut buf)?;
        if n == 0 {
            warn!("EOF on input");
            self.dst.set_eof();
            return Ok(BlockRet::EOF);
        }
        let items: Vec<T> = buf[..n].iter().map(|&b| T::from_byte(b)).collect();
        self.dst.push(&items, &[]);
        Ok(BlockRet::Ok)
    }
}

/// Writes a stream's elements as raw bytes to a file (or stdout, when no
/// path is given), one byte per element.
pub struct ByteSink<T: RawByte> {
    writer: Box<dyn Write>,
    src: ReadStream<T>,
}

impl<T: RawByte> ByteSink<T> {
    /// Create `path` for writing (truncating), or write to stdout when
    /// `path` is `None`.
    pub fn new(path: Option<&Path>, src: ReadStream<T>) -> Result<Self> {
        let writer: Box<dyn Write> = match path {
            Some(p) => {
                debug!("opening sink {}", p.display());
                Box::new(BufWriter::new(std::fs::File::create(p)?))
            }
            None => Box::new(std::io::stdout()),
        };
        Ok(Self { writer, src })
    }
}

impl<T: RawByte> BlockName for ByteSink<T> {
    fn block_name(&self) -> &str {
        "ByteSink"
    }
}

impl<T: RawByte> Block for ByteSink<T> {
    fn work(&mut self) -> Result<BlockRet> {
        let n = self.src.available();
        if n == 0 {
            return Ok(if self.src.eof() { BlockRet::EOF } else { BlockRet::Noop });
        }
        let items = self.src.peek(n);
        self.src.consume(n);
        let bytes: Vec<u8> = items.iter().map(|&x| x.to_byte()).collect();
        self.writer.write_all(&bytes)?;
        self.writer.flush()?;
        Ok(BlockRet::Ok)
    }
}
