//! Validation of the 12-digit individual identification number (IIN).
//!
//! Layout: `YYMMDD` birth date, one century/sex digit, four serial digits and
//! a check digit computed from the first eleven with weights `1..=11`, falling
//! back to `3..=11, 1, 2` when the first pass yields 10.

/// Length of an IIN in digits.
pub const IIN_LEN: usize = 12;

const PRIMARY_WEIGHTS: [u32; 11] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];
const FALLBACK_WEIGHTS: [u32; 11] = [3, 4, 5, 6, 7, 8, 9, 10, 11, 1, 2];

/// The date-of-birth prefix of an IIN together with the century/sex digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BirthDate {
  /// Two-digit year, `0..=99`.
  pub year:        u8,
  pub month:       u8,
  pub day:         u8,
  /// Seventh digit, `1..=6`.
  pub century_sex: u8,
}

/// Split `code` into its twelve digits, or `None` unless it is exactly twelve
/// ASCII decimal digits.
fn digits(code: &str) -> Option<[u8; IIN_LEN]> {
  let bytes = code.as_bytes();
  if bytes.len() != IIN_LEN || !bytes.iter().all(u8::is_ascii_digit) {
    return None;
  }
  let mut out = [0u8; IIN_LEN];
  for (d, b) in out.iter_mut().zip(bytes) {
    *d = b - b'0';
  }
  Some(out)
}

/// Parse and range-check the first seven digits.
///
/// Days are checked against `1..=31` only; month lengths and leap years are
/// not considered.
pub fn birth_date(code: &str) -> Option<BirthDate> {
  let d = digits(code)?;

  let year = d[0] * 10 + d[1];
  if year > 99 {
    return None;
  }
  let month = d[2] * 10 + d[3];
  if !(1..=12).contains(&month) {
    return None;
  }
  let day = d[4] * 10 + d[5];
  if !(1..=31).contains(&day) {
    return None;
  }
  let century_sex = d[6];
  if !(1..=6).contains(&century_sex) {
    return None;
  }

  Some(BirthDate { year, month, day, century_sex })
}

/// Compute the expected check digit from the first eleven digits. `None` when
/// both weightings give 10, which makes the number unusable.
pub fn check_digit(head: &[u8; 11]) -> Option<u8> {
  let weighted = |weights: &[u32; 11]| -> u32 {
    head
      .iter()
      .zip(weights)
      .map(|(&d, &w)| u32::from(d) * w)
      .sum::<u32>()
      % 11
  };

  let mut a = weighted(&PRIMARY_WEIGHTS);
  if a == 10 {
    a = weighted(&FALLBACK_WEIGHTS);
    if a == 10 {
      return None;
    }
  }
  u8::try_from(a).ok()
}

/// `true` iff `code` is a well-formed IIN with a plausible birth date and a
/// matching check digit. Never panics; any malformed input is `false`.
pub fn is_valid(code: &str) -> bool {
  let Some(d) = digits(code) else {
    return false;
  };
  if birth_date(code).is_none() {
    return false;
  }

  let mut head = [0u8; 11];
  head.copy_from_slice(&d[..11]);
  check_digit(&head) == Some(d[11])
}
