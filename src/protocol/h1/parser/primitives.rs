use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::{complete::hex_digit1, is_alphanumeric},
    combinator::{eof, rest},
    sequence::{preceded, tuple},
    IResult,
};

// Primitives
fn is_token_char(i: u8) -> bool {
    is_alphanumeric(i) || b"!#$%&'*+-.^_`|~".contains(&i)
}

fn token(i: &[u8]) -> IResult<&[u8], &[u8]> {
    take_while1(is_token_char)(i)
}

fn is_blank(i: u8) -> bool {
    i == b' ' || i == b'\t'
}

fn blank(i: &[u8]) -> IResult<&[u8], &[u8]> {
    take_while(is_blank)(i)
}

// allows ISO-8859-1 characters in field values
// this is allowed in RFC 2616 but not in rfc7230
#[cfg(feature = "tolerant-parsing")]
fn is_field_value_char(i: u8) -> bool {
    i == 9 || (32..=126).contains(&i) || i >= 160
}

#[cfg(not(feature = "tolerant-parsing"))]
fn is_field_value_char(i: u8) -> bool {
    i == 9 || (32..=126).contains(&i)
}

fn chunk_extension(i: &[u8]) -> IResult<&[u8], &[u8]> {
    preceded(tag(";"), rest)(i)
}

/// parse a chunk-size line stripped of its CRLF, returning the hexadecimal digits of the size.
/// Anything following the first `;` is a chunk extension and is only skipped.
///
/// examples:
/// ```txt
/// 1a              -> "1a"
/// 1a;name=value   -> "1a"
///  4 ; whatever   -> "4"
/// ```
pub fn chunk_size_line(i: &[u8]) -> IResult<&[u8], &[u8]> {
    let (i, (_, size_hexa, _)) = tuple((blank, hex_digit1, blank))(i)?;
    let (i, _) = alt((eof, chunk_extension))(i)?;
    Ok((i, size_hexa))
}

/// convert hexadecimal digits to a chunk size, None if it does not fit in 64 bits
pub fn chunk_size(size_hexa: &[u8]) -> Option<u64> {
    size_hexa.iter().try_fold(0u64, |size, digit| {
        let digit = (*digit as char).to_digit(16)?;
        size.checked_mul(16)?.checked_add(digit as u64)
    })
}

/// parse a trailer field line stripped of its CRLF
///
/// example: `Expires: Wed, 21 Oct 2015 07:28:00 GMT`
pub fn trailer_field(i: &[u8]) -> IResult<&[u8], (&[u8], &[u8])> {
    let (i, (key, _, _, val, _)) = tuple((
        token,
        tag(":"),
        blank,
        take_while(is_field_value_char),
        eof,
    ))(i)?;
    Ok((i, (key, val)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size_of(line: &[u8]) -> Option<u64> {
        chunk_size_line(line)
            .ok()
            .and_then(|(_, size_hexa)| chunk_size(size_hexa))
    }

    #[test]
    fn size_lines() {
        assert_eq!(size_of(b"0"), Some(0));
        assert_eq!(size_of(b"1a"), Some(26));
        assert_eq!(size_of(b"1A;ext"), Some(26));
        assert_eq!(size_of(b"ff;name=\"quoted;value\""), Some(255));
        assert_eq!(size_of(b" 4 ; ext"), Some(4));
        assert_eq!(size_of(b"000000000000000000010"), Some(16));
        assert_eq!(size_of(b"ffffffffffffffff"), Some(u64::MAX));
    }

    #[test]
    fn invalid_size_lines() {
        assert!(chunk_size_line(b"").is_err());
        assert!(chunk_size_line(b"zz").is_err());
        assert!(chunk_size_line(b";ext").is_err());
        assert!(chunk_size_line(b"-1").is_err());
        assert!(chunk_size_line(b"+1").is_err());
        assert!(chunk_size_line(b"1 2").is_err());
        assert!(chunk_size_line(b"0x10").is_err());
    }

    #[test]
    fn overflowing_size() {
        let (_, size_hexa) = chunk_size_line(b"10000000000000000").expect("hex digits");
        assert_eq!(chunk_size(size_hexa), None);
    }

    #[test]
    fn trailer_fields() {
        let (_, (key, val)) = trailer_field(b"X-Trailer: v").expect("field");
        assert_eq!(key, b"X-Trailer");
        assert_eq!(val, b"v");
        assert!(trailer_field(b"no colon").is_err());
        assert!(trailer_field(b": no name").is_err());
    }
}
