/// Minimum number of decimal digits in a generated key.
pub const KEY_DIGITS: usize = 9;

/// Build the key for the record at `ordinal`.
///
/// The numeric part is `offset + ordinal`, zero-padded to [`KEY_DIGITS`] so
/// that lexical and numeric order agree. Larger numbers simply get more
/// digits. The sum is taken in 128 bits, so no input overflows.
pub fn make_key(prefix: &str, offset: u64, ordinal: u64) -> String {
    let n = u128::from(offset) + u128::from(ordinal);
    format!("{prefix}{n:0width$}", width = KEY_DIGITS)
}
