//! 外部から取り込むバイト列の UTF-8 化

/// Placeholder for byte sequences that are not valid UTF-8.
const REPLACEMENT: char = '?';

/// Decode as UTF-8, replacing every invalid sequence with `?`.
pub fn encode_lossy(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
        if !chunk.invalid().is_empty() {
            out.push(REPLACEMENT);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::ascii(b"ok", "ok")]
    #[case::invalid_byte(b"a\xffb", "a?b")]
    #[case::truncated_sequence(b"x\xe3\x81", "x?")]
    #[case::multibyte("héllo".as_bytes(), "héllo")]
    fn encode_lossy_replaces_invalid_sequences(#[case] bytes: &[u8], #[case] expected: &str) {
        assert_eq!(encode_lossy(bytes), expected);
    }
}
