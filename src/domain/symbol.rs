//! Symbol codec for currency-stats scopes
//!
//! Token contracts index their `stat` table by symbol code. The scope index
//! reports that code as an account-name string (e.g. `........ehbo5`), so it
//! has to be unpacked back into the ticker before it is shown.

const NAME_CHARSET: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";

/// Scope strings for the tickers seen on the default networks.
///
/// A lookup fast path only: each entry decodes to the same ticker through
/// [`symbol_code_to_string`], and the generic path handles every other code.
const KNOWN_SYMBOLS: &[(&str, &str)] = &[
    ("........ehbo5", "EOS"),
    (".....lemcd4og", "LIBRE"),
    ("........che42", "BTC"),
    ("......2gche42", "BTCL"),
    ("......2ocldp5", "USDT"),
    ("......23el15", "PBTC"),
    (".....p24ehep", "PUSDT"),
    ("......2nel.p3", "SATS"),
];

/// Decode a packed scope into a symbol code, if it holds one.
pub fn decode_scope_symbol(scope: &str) -> Option<String> {
    if let Some((_, symbol)) = KNOWN_SYMBOLS.iter().find(|(raw, _)| *raw == scope) {
        return Some((*symbol).to_string());
    }
    let value = name_to_u64(scope)?;
    symbol_code_to_string(value)
}

/// Scope formatted for display: `"SYMBOL (raw)"` when it decodes, raw otherwise
pub fn display_scope(scope: &str) -> String {
    match decode_scope_symbol(scope) {
        Some(symbol) if symbol != scope => format!("{} ({})", symbol, scope),
        _ => scope.to_string(),
    }
}

/// Pack an account-name string into its 64-bit value
pub fn name_to_u64(name: &str) -> Option<u64> {
    let bytes = name.as_bytes();
    if bytes.is_empty() || bytes.len() > 13 {
        return None;
    }
    let mut value = 0u64;
    for (i, &ch) in bytes.iter().enumerate() {
        let index = NAME_CHARSET.iter().position(|&c| c == ch)? as u64;
        if i < 12 {
            value |= (index & 0x1f) << (64 - 5 * (i + 1));
        } else {
            // 13th character only has four bits
            if index > 0x0f {
                return None;
            }
            value |= index;
        }
    }
    Some(value)
}

/// Inverse of [`name_to_u64`], trailing dots trimmed
pub fn u64_to_name(value: u64) -> String {
    let mut out = [b'.'; 13];
    let mut rest = value;
    for i in 0..13 {
        let index = if i == 0 {
            let c = rest & 0x0f;
            rest >>= 4;
            c
        } else {
            let c = rest & 0x1f;
            rest >>= 5;
            c
        };
        out[12 - i] = NAME_CHARSET[index as usize];
    }
    String::from_utf8_lossy(&out)
        .trim_end_matches('.')
        .to_string()
}

/// Little-endian packed ticker, uppercase letters up to seven bytes
pub fn symbol_code_to_string(value: u64) -> Option<String> {
    let mut out = String::new();
    let mut rest = value;
    while rest != 0 {
        let byte = (rest & 0xff) as u8;
        if !byte.is_ascii_uppercase() {
            return None;
        }
        out.push(byte as char);
        rest >>= 8;
    }
    if out.is_empty() || out.len() > 7 {
        return None;
    }
    Some(out)
}

/// Pack a ticker into its symbol code
pub fn string_to_symbol_code(symbol: &str) -> Option<u64> {
    if symbol.is_empty() || symbol.len() > 7 || !symbol.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    Some(
        symbol
            .bytes()
            .enumerate()
            .fold(0u64, |acc, (i, b)| acc | (u64::from(b) << (8 * i))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_overrides_match_generic_decoding() {
        for (raw, symbol) in KNOWN_SYMBOLS {
            let code = string_to_symbol_code(symbol).unwrap();
            assert_eq!(u64_to_name(code), *raw, "override for {symbol}");
            let unpacked = name_to_u64(raw).and_then(symbol_code_to_string);
            assert_eq!(unpacked.as_deref(), Some(*symbol));
        }
    }

    #[test]
    fn test_generic_fallback() {
        let code = string_to_symbol_code("XYZ").unwrap();
        let scope = u64_to_name(code);
        assert_eq!(decode_scope_symbol(&scope).as_deref(), Some("XYZ"));
        assert_eq!(display_scope(&scope), format!("XYZ ({})", scope));
    }

    #[test]
    fn test_plain_accounts_do_not_decode() {
        assert_eq!(decode_scope_symbol("eosio.token"), None);
        assert_eq!(display_scope("alice"), "alice");
        assert_eq!(decode_scope_symbol("NOT-A-NAME"), None);
    }

    #[test]
    fn test_name_round_trip() {
        for name in ["eosio", "eosio.token", "a", "zzzzzzzzzzzzj"] {
            let value = name_to_u64(name).unwrap();
            assert_eq!(u64_to_name(value), name);
        }
    }
}
