//! Digit helpers for Brazilian document, phone and postal-code fields.
//! The gateway expects these fields stripped of formatting; the UI layer
//! wants them masked back for display.

/// Strips everything but ASCII digits.
pub fn digits_only(value: &str) -> String {
    value.chars().filter(|ch| ch.is_ascii_digit()).collect()
}

/// Formats an 8-digit CEP as `85850-000`. Inputs with any other digit
/// count come back stripped but unmasked.
pub fn format_cep(cep: &str) -> String {
    let digits = digits_only(cep);
    if digits.len() == 8 {
        format!("{}-{}", &digits[..5], &digits[5..])
    } else {
        digits
    }
}

/// Formats a 10 or 11 digit phone number as `(45) 99999-9999`.
pub fn format_phone(phone: &str) -> String {
    let digits = digits_only(phone);
    match digits.len() {
        11 => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
        10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        _ => digits,
    }
}

/// Formats an 11-digit CPF as `123.456.789-01`.
pub fn format_cpf(cpf: &str) -> String {
    let digits = digits_only(cpf);
    if digits.len() == 11 {
        format!(
            "{}.{}.{}-{}",
            &digits[..3],
            &digits[3..6],
            &digits[6..9],
            &digits[9..]
        )
    } else {
        digits
    }
}
