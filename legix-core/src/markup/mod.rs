//! Source markup handling: reading XML into a raw tree and writing records back out.

mod reader;
mod writer;

pub use reader::{read, RawNode};
pub use writer::{without_lines, write_document, WriterOptions};
