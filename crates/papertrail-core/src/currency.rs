//! Currency formatting in the en-US locale.

use rust_decimal::{Decimal, RoundingStrategy};

/// Taka sign, rendered by hand because the en-US locale data has no symbol for BDT.
const TAKA_SIGN: char = '\u{09f3}';

/// Format `amount` as a currency string (e.g. `$1,234.50`).
///
/// `BDT` gets a literal taka prefix followed by the grouped two-decimal
/// number, sign included (`৳-5.00`). Every other code follows the en-US
/// currency format: sign, symbol, grouped digits, the currency's minor units.
/// Codes without an en-US symbol are written out (`CHF 12.00`).
pub fn format_currency(amount: f64, currency: &str) -> String {
    if currency == "BDT" {
        let sign = if amount < 0.0 { "-" } else { "" };
        return format!("{}{}{}", TAKA_SIGN, sign, format_grouped(amount.abs(), 2));
    }

    let code = currency.trim().to_uppercase();
    let digits = minor_units(&code);
    let prefix = match symbol(&code) {
        Some(symbol) => symbol.to_string(),
        None => format!("{}\u{a0}", code),
    };
    let sign = if amount < 0.0 { "-" } else { "" };

    format!("{}{}{}", sign, prefix, format_grouped(amount.abs(), digits))
}

/// en-US symbol of a currency, if the locale defines one.
fn symbol(code: &str) -> Option<&'static str> {
    let symbol = match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "INR" => "₹",
        "JPY" => "¥",
        "CNY" => "CN¥",
        "CAD" => "CA$",
        "AUD" => "A$",
        "NZD" => "NZ$",
        "HKD" => "HK$",
        "MXN" => "MX$",
        "TWD" => "NT$",
        "BRL" => "R$",
        "KRW" => "₩",
        "ILS" => "₪",
        "VND" => "₫",
        "PHP" => "₱",
        _ => return None,
    };
    Some(symbol)
}

/// ISO 4217 minor units; two unless listed.
fn minor_units(code: &str) -> u32 {
    match code {
        "BIF" | "CLP" | "DJF" | "GNF" | "ISK" | "JPY" | "KMF" | "KRW" | "PYG" | "RWF" | "UGX"
        | "UYI" | "VND" | "VUV" | "XAF" | "XOF" | "XPF" => 0,
        "BHD" | "IQD" | "JOD" | "KWD" | "LYD" | "OMR" | "TND" => 3,
        _ => 2,
    }
}

/// Round half away from zero to `digits` decimals and group thousands with commas.
fn format_grouped(amount: f64, digits: u32) -> String {
    if amount.is_nan() {
        return "NaN".to_string();
    }
    if amount.is_infinite() {
        return "∞".to_string();
    }

    let s = match Decimal::from_f64_retain(amount) {
        Some(value) => {
            let mut rounded =
                value.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(digits);
            rounded.to_string()
        }
        None => format!("{:.*}", digits as usize, amount),
    };

    let (integer_part, fraction_part) = match s.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (s.as_str(), None),
    };

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::with_capacity(s.len() + chars.len() / 3);
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    if let Some(fraction) = fraction_part {
        formatted.push('.');
        formatted.push_str(fraction);
    }
    formatted
}
