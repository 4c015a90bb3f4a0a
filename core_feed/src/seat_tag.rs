//! Positional `[S<n>]` tags embedded in player names.
//!
//! The table client prefixes names like `"[S9] Barmom @ gmuSM0e3Nz"`. The tag
//! decides roster order and hotkey binding; the ` @ <id>` suffix is a client
//! identifier that is never shown.

use std::sync::LazyLock;

use regex::Regex;

static SEAT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[S(\d+)\]").expect("seat tag pattern compiles"));

static SEAT_TAG_WITH_SPACING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[S\d+\]\s*").expect("seat tag strip pattern compiles"));

const ID_SEPARATOR: &str = " @ ";

/// Seat number from the first `[S<n>]` tag, anywhere in the name.
///
/// A tag whose digits do not fit a `u32` is treated as untagged.
pub fn parse_seat_tag(name: &str) -> Option<u32> {
    SEAT_TAG
        .captures(name)
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

/// Name with every seat tag and the trailing ` @ <id>` segment removed.
pub fn display_name(name: &str) -> String {
    let stripped = SEAT_TAG_WITH_SPACING.replace_all(name, "");
    match stripped.split_once(ID_SEPARATOR) {
        Some((head, _)) => head.trim().to_string(),
        None => stripped.trim().to_string(),
    }
}
