use std::{fmt::Write, io::Read};

use crate::{
    h1::ChunkedDecoder,
    storage::{AsBuffer, Buffer, CompletionListener},
};

fn to_utf8(buf: &[u8]) -> &str {
    match std::str::from_utf8(buf) {
        Ok(str) => str,
        Err(_) => "[ERROR::UTF8]",
    }
}

impl<T: AsBuffer> Buffer<T> {
    pub fn debug(&self, pad: &str, result: &mut String) -> Result<(), std::fmt::Error> {
        result.write_fmt(format_args!("Buffer {{"))?;
        result.write_fmt(format_args!("\n{pad}  start: {}", self.start))?;
        result.write_fmt(format_args!(",\n{pad}  end: {}", self.end))?;
        result.write_fmt(format_args!(",\n{pad}  view: {}", self.meter(20)))?;
        result.write_fmt(format_args!(",\n{pad}  data: {:?}", to_utf8(self.data())))?;
        result.write_fmt(format_args!(",\n{pad}}}"))?;
        Ok(())
    }
}

impl<T: AsBuffer, R: Read, L: CompletionListener> ChunkedDecoder<T, R, L> {
    pub fn debug(&self, pad: &str) -> Result<String, std::fmt::Error> {
        let mut result = String::new();
        let pad_field = format!("{pad}  ");
        result.write_fmt(format_args!("ChunkedDecoder {{\n"))?;
        result.write_fmt(format_args!("{pad}  phase: {:?}", self.phase()))?;
        result.write_fmt(format_args!(",\n{pad}  remaining: {}", self.remaining()))?;
        result.write_fmt(format_args!(",\n{pad}  decoded: {}", self.decoded()))?;
        result.write_fmt(format_args!(",\n{pad}  trailers: {}", self.trailer_count()))?;
        result.write_fmt(format_args!(",\n{pad}  line: {:?}", self.line_state()))?;
        {
            let shared = self.source().lock();
            result.write_fmt(format_args!(",\n{pad}  state: {:?}", shared.state))?;
            result.write_fmt(format_args!(",\n{pad}  buffer: "))?;
            shared.storage.debug(&pad_field, &mut result)?;
        }
        result.write_fmt(format_args!(",\n{pad}}}"))?;
        Ok(result)
    }
}

pub fn debug_decoder<T: AsBuffer, R: Read, L: CompletionListener>(
    decoder: &ChunkedDecoder<T, R, L>,
) {
    match decoder.debug("") {
        Ok(result) => println!("{result}"),
        Err(error) => println!("{error:?}"),
    }
}
