use proptest::prelude::*;

use nagare::{h1::ChunkedDecoder, Buffer, BufferedSource, Fragments, Progress};

fn chunk() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 1..96)
}

fn extension() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(";name".to_string())),
        "[a-z]{1,8}=[a-z0-9]{0,8}".prop_map(|ext| Some(format!(";{ext}"))),
    ]
}

fn trailer() -> impl Strategy<Value = String> {
    "[A-Za-z-]{1,16}: [ -~]{0,32}"
}

fn encode(chunks: &[(Vec<u8>, Option<String>, bool)], trailers: &[String]) -> Vec<u8> {
    let mut encoded = Vec::new();
    for (data, ext, upper) in chunks {
        let size = if *upper {
            format!("{:X}", data.len())
        } else {
            format!("{:x}", data.len())
        };
        encoded.extend_from_slice(size.as_bytes());
        if let Some(ext) = ext {
            encoded.extend_from_slice(ext.as_bytes());
        }
        encoded.extend_from_slice(b"\r\n");
        encoded.extend_from_slice(data);
        encoded.extend_from_slice(b"\r\n");
    }
    encoded.extend_from_slice(b"0\r\n");
    for trailer in trailers {
        encoded.extend_from_slice(trailer.as_bytes());
        encoded.extend_from_slice(b"\r\n");
    }
    encoded.extend_from_slice(b"\r\n");
    encoded
}

fn split(encoded: &[u8], cuts: &[usize]) -> Vec<Vec<u8>> {
    let mut cuts = cuts
        .iter()
        .map(|cut| cut % (encoded.len() + 1))
        .collect::<Vec<_>>();
    cuts.sort_unstable();
    cuts.dedup();
    let mut fragments = Vec::new();
    let mut start = 0;
    for cut in cuts.into_iter().chain([encoded.len()]) {
        fragments.push(encoded[start..cut].to_vec());
        start = cut;
    }
    fragments
}

fn decode(fragments: &[Vec<u8>], capacity: usize, out_len: usize) -> (Vec<u8>, usize) {
    let source = BufferedSource::new(
        Buffer::new(vec![0; capacity]),
        Fragments::interleaved(fragments),
    );
    let mut decoder = ChunkedDecoder::new(source);
    let mut body = Vec::new();
    let mut out = vec![0; out_len];
    loop {
        match decoder.read(&mut out).expect("valid chunked body") {
            Progress::Read(count) => body.extend_from_slice(&out[..count]),
            Progress::Pending => {}
            Progress::End => return (body, decoder.trailer_count()),
        }
    }
}

proptest! {
    #[test]
    fn fragmentation_invariance(
        chunks in proptest::collection::vec((chunk(), extension(), any::<bool>()), 0..8),
        trailers in proptest::collection::vec(trailer(), 0..3),
        cuts in proptest::collection::vec(any::<usize>(), 0..16),
        capacity in 1usize..64,
        out_len in 1usize..32,
    ) {
        let encoded = encode(&chunks, &trailers);
        let expected = chunks
            .iter()
            .flat_map(|(data, _, _)| data.iter().copied())
            .collect::<Vec<_>>();

        let (whole, _) = decode(&[encoded.clone()], 4096, 4096);
        prop_assert_eq!(&whole, &expected);

        let (body, trailer_count) = decode(&split(&encoded, &cuts), capacity, out_len);
        prop_assert_eq!(body, expected);
        prop_assert_eq!(trailer_count, trailers.len());
    }
}
