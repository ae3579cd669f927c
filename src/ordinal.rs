//! Positional labels used by the renumbering pass.

const ROMAN_TABLE: [(u32, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

pub const ROMAN_MAX: u32 = 3999;

/// Standard subtractive Roman numeral for `1..=3999`.
pub fn to_roman(value: u32) -> Option<String> {
    if value == 0 || value > ROMAN_MAX {
        return None;
    }
    let mut remaining = value;
    let mut out = String::new();
    for (amount, symbol) in ROMAN_TABLE {
        while remaining >= amount {
            out.push_str(symbol);
            remaining -= amount;
        }
    }
    Some(out)
}

/// Parses a canonical numeral; non-canonical spellings such as `IIII` are rejected.
pub fn from_roman(text: &str) -> Option<u32> {
    if text.is_empty() {
        return None;
    }
    let mut rest = text;
    let mut total = 0u32;
    for (amount, symbol) in ROMAN_TABLE {
        while let Some(tail) = rest.strip_prefix(symbol) {
            total += amount;
            rest = tail;
        }
    }
    if !rest.is_empty() {
        return None;
    }
    match to_roman(total) {
        Some(canonical) if canonical == text => Some(total),
        _ => None,
    }
}

/// Bijective base-26 letters: 1 -> A, 26 -> Z, 27 -> AA, 52 -> AZ, 53 -> BA.
pub fn to_letters(value: u32) -> Option<String> {
    if value == 0 {
        return None;
    }
    let mut remaining = value;
    let mut letters = Vec::new();
    while remaining > 0 {
        remaining -= 1;
        letters.push(b'A' + (remaining % 26) as u8);
        remaining /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrdinalStyle {
    Decimal,
    Letters,
    Roman,
}

impl OrdinalStyle {
    /// Label for the 1-based `position`. Roman positions past 3999 fall back to decimal.
    pub fn label(self, position: usize) -> String {
        let value = u32::try_from(position).unwrap_or(u32::MAX);
        let styled = match self {
            OrdinalStyle::Decimal => None,
            OrdinalStyle::Letters => to_letters(value),
            OrdinalStyle::Roman => to_roman(value),
        };
        styled.unwrap_or_else(|| position.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roman_known_values() {
        let cases = [
            (1, "I"),
            (4, "IV"),
            (9, "IX"),
            (14, "XIV"),
            (39, "XXXIX"),
            (40, "XL"),
            (90, "XC"),
            (400, "CD"),
            (944, "CMXLIV"),
            (1994, "MCMXCIV"),
            (3999, "MMMCMXCIX"),
        ];
        for (value, expected) in cases {
            assert_eq!(to_roman(value).as_deref(), Some(expected), "{value}");
        }
    }

    #[test]
    fn roman_round_trips_full_range() {
        for value in 1..=ROMAN_MAX {
            let text = to_roman(value).expect("in range");
            assert_eq!(from_roman(&text), Some(value), "{text}");
        }
    }

    #[test]
    fn roman_rejects_out_of_range_and_noncanonical() {
        assert_eq!(to_roman(0), None);
        assert_eq!(to_roman(4000), None);
        assert_eq!(from_roman("IIII"), None);
        assert_eq!(from_roman("VX"), None);
        assert_eq!(from_roman("ABC"), None);
        assert_eq!(from_roman(""), None);
    }

    #[test]
    fn letters_continue_past_z() {
        assert_eq!(to_letters(1).as_deref(), Some("A"));
        assert_eq!(to_letters(2).as_deref(), Some("B"));
        assert_eq!(to_letters(26).as_deref(), Some("Z"));
        assert_eq!(to_letters(27).as_deref(), Some("AA"));
        assert_eq!(to_letters(52).as_deref(), Some("AZ"));
        assert_eq!(to_letters(53).as_deref(), Some("BA"));
        assert_eq!(to_letters(702).as_deref(), Some("ZZ"));
        assert_eq!(to_letters(703).as_deref(), Some("AAA"));
        assert_eq!(to_letters(0), None);
    }

    #[test]
    fn styles_label_positions() {
        assert_eq!(OrdinalStyle::Decimal.label(12), "12");
        assert_eq!(OrdinalStyle::Letters.label(3), "C");
        assert_eq!(OrdinalStyle::Roman.label(2), "II");
        assert_eq!(OrdinalStyle::Roman.label(4000), "4000");
    }
}
