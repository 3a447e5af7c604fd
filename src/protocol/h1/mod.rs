pub mod chunked;
pub mod line;
pub mod parser;

pub use chunked::ChunkedDecoder;
pub use line::LineAccumulator;
