//! Per-type validation of raw form input
//!
//! Validation is permissive: empty input means "not entered yet" and type
//! names we do not know pass through, so new ABI types never block a form.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Why a raw value was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidValue {
    #[error("must be 1-12 characters")]
    NameLength,
    #[error("only a-z, 1-5 and '.' are allowed")]
    NameCharset,
    #[error("dots cannot lead, trail or repeat")]
    NameDots,
    #[error("expected digits only")]
    NotUnsigned,
    #[error("expected a whole number")]
    NotInteger,
    #[error("out of range for {kind}")]
    OutOfRange { kind: String },
    #[error("expected a decimal number")]
    NotDecimal,
    #[error("expected true, false, 1 or 0")]
    NotBool,
    #[error("expected amount and symbol, e.g. 1.0000 LIBRE")]
    BadAsset,
    #[error("expected a symbol, e.g. 4,LIBRE")]
    BadSymbol,
    #[error("expected a unix timestamp or a date")]
    BadTime,
    #[error("expected 64 lowercase hex characters")]
    BadChecksum,
    #[error("expected an EOS... or PUB_K1_... key")]
    BadPublicKey,
    #[error("expected a SIG_K1_... signature")]
    BadSignature,
}

/// Validate `raw` against the ABI type `kind`
pub fn validate(kind: &str, raw: &str) -> Result<(), InvalidValue> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(());
    }

    match kind {
        "name" => validate_account_name(value),
        "uint8" => check_unsigned(kind, value, u128::from(u8::MAX)),
        "uint16" => check_unsigned(kind, value, u128::from(u16::MAX)),
        "uint32" => check_unsigned(kind, value, u128::from(u32::MAX)),
        "uint64" | "uint" => check_unsigned(kind, value, u128::from(u64::MAX)),
        "int8" => check_signed(kind, value, i128::from(i8::MIN), i128::from(i8::MAX)),
        "int16" => check_signed(kind, value, i128::from(i16::MIN), i128::from(i16::MAX)),
        "int32" => check_signed(kind, value, i128::from(i32::MIN), i128::from(i32::MAX)),
        "int64" | "int" => check_signed(kind, value, i128::from(i64::MIN), i128::from(i64::MAX)),
        "float" | "double" | "float32" | "float64" => check_decimal(value),
        "bool" => check_bool(value),
        "asset" => check_asset(value),
        "symbol" => check_symbol(value),
        "time" | "time_point" | "time_point_sec" => check_time(value),
        "checksum256" => check_checksum256(value),
        "public_key" => check_public_key(value),
        "signature" => check_signature(value),
        _ => Ok(()),
    }
}

/// Account-name rule, also used for contract selection.
///
/// Unlike [`validate`], an empty name is rejected.
pub fn validate_account_name(name: &str) -> Result<(), InvalidValue> {
    if name.is_empty() || name.len() > 12 {
        return Err(InvalidValue::NameLength);
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || (b'1'..=b'5').contains(&b) || b == b'.')
    {
        return Err(InvalidValue::NameCharset);
    }
    if name.starts_with('.') || name.ends_with('.') || name.contains("..") {
        return Err(InvalidValue::NameDots);
    }
    Ok(())
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn check_unsigned(kind: &str, value: &str, max: u128) -> Result<(), InvalidValue> {
    if !is_digits(value) {
        return Err(InvalidValue::NotUnsigned);
    }
    match value.parse::<u128>() {
        Ok(n) if n <= max => Ok(()),
        // all digits, so a parse failure can only be overflow
        _ => Err(InvalidValue::OutOfRange {
            kind: kind.to_string(),
        }),
    }
}

fn check_signed(kind: &str, value: &str, min: i128, max: i128) -> Result<(), InvalidValue> {
    let digits = value.strip_prefix('-').unwrap_or(value);
    if !is_digits(digits) {
        return Err(InvalidValue::NotInteger);
    }
    match value.parse::<i128>() {
        Ok(n) if (min..=max).contains(&n) => Ok(()),
        _ => Err(InvalidValue::OutOfRange {
            kind: kind.to_string(),
        }),
    }
}

fn is_decimal(value: &str) -> bool {
    let (whole, frac) = match value.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (value, None),
    };
    let whole_ok = whole.is_empty() || is_digits(whole);
    match frac {
        None => is_digits(whole),
        Some(frac) => {
            whole_ok
                && (frac.is_empty() || is_digits(frac))
                && !(whole.is_empty() && frac.is_empty())
        }
    }
}

fn check_decimal(value: &str) -> Result<(), InvalidValue> {
    let unsigned = value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value);
    if is_decimal(unsigned) {
        Ok(())
    } else {
        Err(InvalidValue::NotDecimal)
    }
}

fn check_bool(value: &str) -> Result<(), InvalidValue> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "false" | "1" | "0" => Ok(()),
        _ => Err(InvalidValue::NotBool),
    }
}

fn is_symbol_code(value: &str) -> bool {
    (1..=7).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_uppercase())
}

fn check_asset(value: &str) -> Result<(), InvalidValue> {
    let Some((amount, symbol)) = value.split_once(' ') else {
        return Err(InvalidValue::BadAsset);
    };
    let amount_ok = match amount.split_once('.') {
        Some((whole, frac)) => is_digits(whole) && is_digits(frac),
        None => is_digits(amount),
    };
    if amount_ok && is_symbol_code(symbol) {
        Ok(())
    } else {
        Err(InvalidValue::BadAsset)
    }
}

fn check_symbol(value: &str) -> Result<(), InvalidValue> {
    let code = match value.split_once(',') {
        Some((precision, code)) if is_digits(precision) => code,
        Some(_) => return Err(InvalidValue::BadSymbol),
        None => value,
    };
    if is_symbol_code(code) {
        Ok(())
    } else {
        Err(InvalidValue::BadSymbol)
    }
}

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

fn check_time(value: &str) -> Result<(), InvalidValue> {
    if is_digits(value.strip_prefix('-').unwrap_or(value)) {
        return Ok(());
    }
    let parsed = DateTime::parse_from_rfc3339(value).is_ok()
        || DateTime::parse_from_rfc2822(value).is_ok()
        || DATE_TIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(value, fmt).is_ok())
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok();
    if parsed {
        Ok(())
    } else {
        Err(InvalidValue::BadTime)
    }
}

fn check_checksum256(value: &str) -> Result<(), InvalidValue> {
    let lowercase = value
        .bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    if value.len() == 64 && lowercase && hex::decode(value).is_ok() {
        Ok(())
    } else {
        Err(InvalidValue::BadChecksum)
    }
}

fn is_alphanumeric(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_alphanumeric())
}

fn check_public_key(value: &str) -> Result<(), InvalidValue> {
    let body = value
        .strip_prefix("PUB_K1_")
        .or_else(|| value.strip_prefix("EOS"));
    match body {
        Some(body) if is_alphanumeric(body) => Ok(()),
        _ => Err(InvalidValue::BadPublicKey),
    }
}

fn check_signature(value: &str) -> Result<(), InvalidValue> {
    match value.strip_prefix("SIG_K1_") {
        Some(body) if is_alphanumeric(body) => Ok(()),
        _ => Err(InvalidValue::BadSignature),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_unknown_are_permissive() {
        for kind in ["name", "uint64", "asset", "checksum256", "bool"] {
            assert_eq!(validate(kind, ""), Ok(()));
            assert_eq!(validate(kind, "   "), Ok(()));
        }
        assert_eq!(validate("bytes", "anything at all"), Ok(()));
        assert_eq!(validate("extended_asset", "???"), Ok(()));
        assert_eq!(validate("string", "free text, 'quoted'"), Ok(()));
    }

    #[test]
    fn test_name_rules() {
        assert_eq!(validate("name", "valid.acct"), Ok(()));
        assert_eq!(validate("name", "alice"), Ok(()));
        assert_eq!(validate("name", "ab..c"), Err(InvalidValue::NameDots));
        assert_eq!(validate("name", ".alice"), Err(InvalidValue::NameDots));
        assert_eq!(validate("name", "alice."), Err(InvalidValue::NameDots));
        assert_eq!(validate("name", "Alice"), Err(InvalidValue::NameCharset));
        assert_eq!(validate("name", "alice6"), Err(InvalidValue::NameCharset));
        assert_eq!(validate("name", "abcdefghijklm"), Err(InvalidValue::NameLength));
        assert_eq!(validate_account_name(""), Err(InvalidValue::NameLength));
    }

    #[test]
    fn test_unsigned_bounds() {
        assert_eq!(validate("uint64", "18446744073709551615"), Ok(()));
        assert!(matches!(
            validate("uint64", "18446744073709551616"),
            Err(InvalidValue::OutOfRange { .. })
        ));
        assert_eq!(validate("uint", "18446744073709551615"), Ok(()));
        assert_eq!(validate("uint8", "255"), Ok(()));
        assert!(validate("uint8", "256").is_err());
        assert_eq!(validate("uint32", "4294967295"), Ok(()));
        assert!(validate("uint32", "4294967296").is_err());
        assert_eq!(validate("uint16", "-1"), Err(InvalidValue::NotUnsigned));
        assert_eq!(validate("uint64", "1.5"), Err(InvalidValue::NotUnsigned));
        assert!(matches!(
            validate("uint64", "99999999999999999999999999999999999999999"),
            Err(InvalidValue::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_signed_bounds() {
        assert_eq!(validate("int8", "-128"), Ok(()));
        assert!(validate("int8", "128").is_err());
        assert_eq!(validate("int64", "-9223372036854775808"), Ok(()));
        assert!(validate("int64", "9223372036854775808").is_err());
        assert_eq!(validate("int", "9223372036854775807"), Ok(()));
        assert_eq!(validate("int32", "--1"), Err(InvalidValue::NotInteger));
        assert_eq!(validate("int16", "-"), Err(InvalidValue::NotInteger));
    }

    #[test]
    fn test_decimal_and_bool() {
        for ok in ["1", "-1.5", "+0.25", ".5", "3."] {
            assert_eq!(validate("float", ok), Ok(()), "{ok}");
        }
        for bad in [".", "1.2.3", "abc", "-"] {
            assert_eq!(validate("double", bad), Err(InvalidValue::NotDecimal), "{bad}");
        }
        for ok in ["true", "FALSE", "1", "0"] {
            assert_eq!(validate("bool", ok), Ok(()));
        }
        assert_eq!(validate("bool", "yes"), Err(InvalidValue::NotBool));
    }

    #[test]
    fn test_asset_and_symbol() {
        assert_eq!(validate("asset", "1.0000 LIBRE"), Ok(()));
        assert_eq!(validate("asset", "10 BTC"), Ok(()));
        assert_eq!(validate("asset", "1.0000 libre"), Err(InvalidValue::BadAsset));
        assert_eq!(validate("asset", "1.0000"), Err(InvalidValue::BadAsset));
        assert_eq!(validate("asset", "1. LIBRE"), Err(InvalidValue::BadAsset));
        assert_eq!(validate("asset", "1 TOOLONGX"), Err(InvalidValue::BadAsset));
        assert_eq!(validate("symbol", "4,LIBRE"), Ok(()));
        assert_eq!(validate("symbol", "BTC"), Ok(()));
        assert_eq!(validate("symbol", "x,BTC"), Err(InvalidValue::BadSymbol));
        assert_eq!(validate("symbol", "8,"), Err(InvalidValue::BadSymbol));
    }

    #[test]
    fn test_time_values() {
        assert_eq!(validate("time_point_sec", "1704067200"), Ok(()));
        assert_eq!(validate("time_point", "2024-01-01T00:00:00"), Ok(()));
        assert_eq!(validate("time_point", "2024-01-01T00:00:00.500"), Ok(()));
        assert_eq!(validate("time", "2024-01-01T00:00:00Z"), Ok(()));
        assert_eq!(validate("time", "2024-01-01"), Ok(()));
        assert_eq!(validate("time", "next tuesday"), Err(InvalidValue::BadTime));
    }

    #[test]
    fn test_keys_and_hashes() {
        let hash = "a".repeat(64);
        assert_eq!(validate("checksum256", &hash), Ok(()));
        assert_eq!(
            validate("checksum256", &"A".repeat(64)),
            Err(InvalidValue::BadChecksum)
        );
        assert_eq!(
            validate("checksum256", &"a".repeat(63)),
            Err(InvalidValue::BadChecksum)
        );
        assert_eq!(
            validate("public_key", "EOS6MRyAjQq8ud7hVNYcfnVPJqcVpscN5So8BhtHuGYqET5GDW5CV"),
            Ok(())
        );
        assert_eq!(validate("public_key", "PUB_K1_6MRyAjQq8ud7h"), Ok(()));
        assert_eq!(validate("public_key", "PUB_R1_abc"), Err(InvalidValue::BadPublicKey));
        assert_eq!(validate("public_key", "EOS"), Err(InvalidValue::BadPublicKey));
        assert_eq!(validate("signature", "SIG_K1_Kabc123"), Ok(()));
        assert_eq!(validate("signature", "SIG_R1_abc"), Err(InvalidValue::BadSignature));
    }
}
