//! Card helpers used for diagnostics only.

/// Map a card number to its network label by prefix.
pub fn classify(number: &str) -> &'static str {
    if number.starts_with('4') {
        "Visa"
    } else if number.starts_with("34") || number.starts_with("37") {
        "American Express"
    } else if number.starts_with('5') {
        "Mastercard"
    } else {
        "other"
    }
}

/// Last five characters of the card number, or the whole number if shorter.
pub fn masked_suffix(number: &str) -> &str {
    let start = number
        .char_indices()
        .rev()
        .nth(4)
        .map_or(0, |(idx, _)| idx);
    &number[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_known_networks() {
        assert_eq!(classify("4111111111111111"), "Visa");
        assert_eq!(classify("378282246310005"), "American Express");
        assert_eq!(classify("341111111111111"), "American Express");
        assert_eq!(classify("5500000000000004"), "Mastercard");
    }

    #[test]
    fn classify_falls_back_to_other() {
        assert_eq!(classify("6011000000000004"), "other");
        assert_eq!(classify("3530111333300000"), "other");
        assert_eq!(classify(""), "other");
    }

    #[test]
    fn masked_suffix_keeps_last_five() {
        assert_eq!(masked_suffix("4111111111111111"), "11111");
        assert_eq!(masked_suffix("378282246310005"), "10005");
    }

    #[test]
    fn masked_suffix_short_number() {
        assert_eq!(masked_suffix("123"), "123");
        assert_eq!(masked_suffix("12345"), "12345");
        assert_eq!(masked_suffix(""), "");
    }
}
