use rand::{Rng, distr::Alphanumeric};

/// Maximum number of characters kept when quoting an upstream response body
/// in an error or log line.
pub const BODY_SNIPPET_LEN: usize = 200;

/// Generates a random alphanumeric `state` value for the authorization
/// request, echoed back by the provider and checked in the callback.
pub fn generate_state_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Trims an upstream response body down to a single loggable line.
pub fn snippet(body: &str) -> String {
    let mut cut: String = body.trim().chars().take(BODY_SNIPPET_LEN).collect();
    if body.trim().chars().count() > BODY_SNIPPET_LEN {
        cut.push('…');
    }
    cut.replace('\n', " ")
}

/// Formats a count with thousands separators, e.g. `12345` -> `12,345`.
pub fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
