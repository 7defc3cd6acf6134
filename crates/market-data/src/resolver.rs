//! Yahoo symbol resolution.
//!
//! Maps directory symbols to Yahoo Finance tickers. Tickers already in
//! Yahoo form pass through unchanged. Exchange suffixes used by upstream listings
//! differ from Yahoo's: `.NSE` is `.NS`, `.BSE` is `.BO`, US listings carry
//! no suffix, and crypto pairs are quoted against USD.

/// Suffixes that are already in Yahoo form. Matched as suffixes so that
/// `.NSE` is not mistaken for `.NS`.
const YAHOO_NATIVE_MARKERS: &[&str] = &[".NS", ".BO", "-USD"];

const CRYPTO_SUFFIX: &str = ".CC";
const CRYPTO_QUOTE: &str = "-USD";

/// Convert a directory symbol to the ticker Yahoo expects.
pub fn to_yahoo_symbol(symbol: &str) -> String {
    if YAHOO_NATIVE_MARKERS.iter().any(|m| symbol.ends_with(m)) {
        return symbol.to_string();
    }

    if symbol.contains(CRYPTO_SUFFIX) {
        let stripped = symbol.replace(CRYPTO_SUFFIX, "");
        let base = stripped.split('-').next().unwrap_or(&stripped);
        return format!("{}{}", base, CRYPTO_QUOTE);
    }

    if symbol.contains(".NSE") {
        return symbol.replace(".NSE", ".NS");
    }

    if let Some(base) = symbol.strip_suffix(".BSE") {
        return format!("{}.BO", base);
    }

    if let Some(base) = symbol.strip_suffix(".US") {
        return base.to_string();
    }

    symbol.to_string()
}
