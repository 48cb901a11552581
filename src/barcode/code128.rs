//! CODE128 module encoding.
//!
//! Uses the barcoders crate with character set B, which covers the full
//! printable ASCII range that category/SKU values draw from. Encoding is
//! deterministic: the same value always yields the same bar pattern.

use barcoders::sym::code128::Code128;

use crate::error::PrintError;

/// barcoders selects the CODE128 character set from a Unicode prefix:
/// `Ā` for set A, `Ɓ` for set B, `Ć` for set C.
const CHARSET_B_PREFIX: char = '\u{0181}';

/// Encode a value as CODE128 modules.
///
/// Returns one bool per module, `true` where a bar is printed. The pattern
/// includes the start code, data symbols, checksum and stop pattern, but
/// no quiet zone; renderers add their own.
pub fn modules(value: &str) -> Result<Vec<bool>, PrintError> {
    if value.is_empty() {
        return Err(PrintError::EncodingInvalid(
            "barcode value is empty".to_string(),
        ));
    }

    let prefixed = format!("{}{}", CHARSET_B_PREFIX, value);
    let barcode = Code128::new(&prefixed).map_err(|e| {
        PrintError::EncodingInvalid(format!("value {:?} is not CODE128-encodable: {}", value, e))
    })?;

    Ok(barcode.encode().iter().map(|&m| m == 1).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_encoding_is_deterministic() {
        let a = modules("CF-98765").unwrap();
        let b = modules("CF-98765").unwrap();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_module_count() {
        // Set B: start + N data symbols + checksum at 11 modules each,
        // then the 13-module stop pattern.
        let value = "CF-98765";
        let bars = modules(value).unwrap();
        assert_eq!(bars.len(), 11 * (value.len() + 2) + 13);
    }

    #[test]
    fn test_starts_with_start_b() {
        // Start code B is 11010010000.
        let bars = modules("A").unwrap();
        let start: Vec<bool> = [1, 1, 0, 1, 0, 0, 1, 0, 0, 0, 0]
            .iter()
            .map(|&b| b == 1)
            .collect();
        assert_eq!(&bars[..11], &start[..]);
    }

    #[test]
    fn test_distinct_values_distinct_patterns() {
        assert_ne!(modules("CF-98765").unwrap(), modules("CF-98766").unwrap());
    }

    #[test]
    fn test_empty_value_rejected() {
        assert_eq!(
            modules("").unwrap_err().kind(),
            ErrorKind::EncodingInvalid
        );
    }
}
