use unbound_common::error::{Result, UnboundError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyValueLine<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

/// Splits one stats line into its key and value.
///
/// Exactly one `=` with a non-empty field on each side is accepted. Anything
/// else is a [`UnboundError::MalformedLine`], which aborts the whole pass.
pub fn parse_line(line: &str) -> Result<KeyValueLine<'_>> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut fields = line.split('=');

    match (fields.next(), fields.next(), fields.next()) {
        (Some(key), Some(value), None) if !key.is_empty() && !value.is_empty() => {
            Ok(KeyValueLine { key, value })
        }
        _ => Err(UnboundError::malformed_line(line)),
    }
}

/// Decodes one raw line. Bytes that are not UTF-8 make the line malformed.
pub fn decode_line(raw: &[u8]) -> Result<&str> {
    std::str::from_utf8(raw)
        .map_err(|_| UnboundError::malformed_line(&String::from_utf8_lossy(raw)))
}

pub(crate) fn parse_f64(key: &str, value: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .map_err(|_| UnboundError::numeric_parse(key, value, "float"))
}

pub(crate) fn parse_finite_f64(key: &str, value: &str) -> Result<f64> {
    let parsed = parse_f64(key, value)?;
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(UnboundError::numeric_parse(key, value, "finite float"))
    }
}

pub(crate) fn parse_u64(key: &str, value: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .map_err(|_| UnboundError::numeric_parse(key, value, "unsigned integer"))
}
