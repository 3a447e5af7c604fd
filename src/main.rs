use nagare::{
    debug_decoder, h1::ChunkedDecoder, Buffer, BufferedSource, Fragments, Progress, SliceBuffer,
};

fn decode(storage: &mut [u8], fragments: Vec<&[u8]>) {
    let source = BufferedSource::new(
        Buffer::new(SliceBuffer(storage)),
        Fragments::interleaved(fragments),
    );
    let mut decoder = ChunkedDecoder::new(source);
    let mut body = Vec::new();
    let mut out = [0; 16];

    loop {
        match decoder.read(&mut out) {
            Ok(Progress::Read(count)) => body.extend_from_slice(&out[..count]),
            Ok(Progress::Pending) => {}
            Ok(Progress::End) => break,
            Err(error) => {
                println!("{error}");
                break;
            }
        }
        debug_decoder(&decoder);
    }
    debug_decoder(&decoder);

    let result = String::from_utf8_lossy(&body);
    println!("===============================\n{result}\n===============================");
}

fn main() {
    env_logger::init();

    let mut buffer = vec![0; 512];
    decode(
        &mut buffer,
        vec![b"4\r\nWiki\r\n5\r\npedia\r\n0\r\nFoo: bar\r\n\r\n"],
    );

    decode(
        &mut buffer[..8],
        vec![
            b"4",
            b"\r\nWi",
            b"ki\r\n5\r\npedia\r\n0",
            b"\r\nFoo: bar\r",
            b"\n\r\n",
        ],
    );

    decode(
        &mut buffer,
        vec![b"1a", b";ext=value\r\n", b"abcdefghijklmnopqrstuvwxyz\r\n0\r\n\r\n"],
    );

    decode(&mut buffer, vec![b"4\r\nWiki\r\nzz\r\n"]);
}
