//! Locale Formatter
//!
//! Renders cent counts as currency strings for a fixed locale, and exposes the
//! symbol and separators the amount parser needs to undo that rendering.

/// Capability for rendering monetary amounts in one locale.
pub trait LocaleFormatter: Send + Sync {
    /// Currency symbol placed before the number (e.g. `R$`).
    fn currency_symbol(&self) -> &str;

    /// Character between the integer and fractional parts.
    fn decimal_separator(&self) -> char;

    /// Character between thousands groups.
    fn grouping_separator(&self) -> char;

    /// Format a cent count with exactly two fractional digits.
    fn format_cents(&self, cents: u64) -> String;
}

/// Table-driven currency locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyLocale {
    pub tag: &'static str,
    pub symbol: &'static str,
    pub decimal_separator: char,
    pub grouping_separator: char,
    /// Separator between symbol and number, if the locale uses one
    pub symbol_spacing: Option<char>,
}

impl CurrencyLocale {
    /// Brazilian real, `R$ 1.234,56` (non-breaking space after the symbol).
    pub const PT_BR: Self = Self {
        tag: "pt-BR",
        symbol: "R$",
        decimal_separator: ',',
        grouping_separator: '.',
        symbol_spacing: Some('\u{a0}'),
    };

    /// US dollar, `$1,234.56`.
    pub const EN_US: Self = Self {
        tag: "en-US",
        symbol: "$",
        decimal_separator: '.',
        grouping_separator: ',',
        symbol_spacing: None,
    };
}

impl Default for CurrencyLocale {
    fn default() -> Self {
        Self::PT_BR
    }
}

impl LocaleFormatter for CurrencyLocale {
    fn currency_symbol(&self) -> &str {
        self.symbol
    }

    fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    fn grouping_separator(&self) -> char {
        self.grouping_separator
    }

    fn format_cents(&self, cents: u64) -> String {
        let units = (cents / 100).to_string();
        let fraction = cents % 100;

        let mut out = String::with_capacity(units.len() * 4 / 3 + 8);
        out.push_str(self.symbol);
        if let Some(spacing) = self.symbol_spacing {
            out.push(spacing);
        }
        push_grouped(&mut out, &units, self.grouping_separator);
        out.push(self.decimal_separator);
        out.push_str(&format!("{:02}", fraction));
        out
    }
}

/// Append `digits` to `out`, inserting `separator` every three digits from the right.
fn push_grouped(out: &mut String, digits: &str, separator: char) {
    let len = digits.len();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
}
