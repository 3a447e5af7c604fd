mod primitives;

pub use primitives::{chunk_size, chunk_size_line, trailer_field};
