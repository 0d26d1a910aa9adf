//! Phone number helpers.

/// Join an area code and a local number into the E.164-style destination
/// used for message delivery.
///
/// A leading `+` on the area code is preserved and added when missing; a
/// single leading `0` on the local number (trunk prefix) is dropped.
/// Callers must reject a blank local number first: an empty `phone` yields
/// the bare `+{area}`.
///
/// ```
/// use shofy_domain::phone::full_number;
///
/// assert_eq!(full_number("+62", "81234567890"), "+6281234567890");
/// assert_eq!(full_number("62", "081234567890"), "+6281234567890");
/// ```
pub fn full_number(area_code: &str, phone: &str) -> String {
    let area = area_code.trim().trim_start_matches('+');
    let local = phone.trim();
    let local = local.strip_prefix('0').unwrap_or(local);
    format!("+{area}{local}")
}

/// Mask all but the last four digits of a phone number.
///
/// Non-digit characters (`+`, spaces) are kept in place. Numbers with four or
/// fewer digits are returned unchanged.
///
/// ```
/// use shofy_domain::phone::mask;
///
/// assert_eq!(mask("+6281234567890"), "+*********7890");
/// assert_eq!(mask("1234"), "1234");
/// ```
pub fn mask(phone: &str) -> String {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    let hidden = digits.saturating_sub(4);
    let mut seen = 0;
    phone
        .chars()
        .map(|c| {
            if c.is_ascii_digit() {
                seen += 1;
                if seen <= hidden { '*' } else { c }
            } else {
                c
            }
        })
        .collect()
}
