//! Convenient mod collecting this crate's blocks for import.
pub use crate::decoder::DecoderBlock;
pub use crate::io_blocks::{ByteSink, ByteSource};
pub use crate::parser::ParserBlock;
