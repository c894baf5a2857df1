//! Decoding of the free-text info field carried on server introductions.

/// Maximum stored length of the info field
pub const INFO_LENGTH_MAX: usize = 50;

/// Placeholder used when an introduction carries no usable info text
pub const UNKNOWN_LOCATION: &str = "(Unknown Location)";

const HIDDEN_MARKER: &str = "(H)";

/// Decode a raw server info field into its display form and hidden flag.
///
/// The first word is dropped when it looks like a `[1.2.3.4]` address
/// annotation, and a leading `(H)` marker sets the hidden flag. Decoding
/// never fails; input with nothing left to display yields
/// [`UNKNOWN_LOCATION`].
pub fn decode_server_info(raw: &str) -> (String, bool) {
    let mut truncated = raw;
    if truncated.len() > INFO_LENGTH_MAX {
        let mut end = INFO_LENGTH_MAX;
        while !truncated.is_char_boundary(end) {
            end -= 1;
        }
        truncated = &truncated[..end];
    }

    // only the first word is checked for an address annotation
    let mut rest = truncated;
    if let Some((head, tail)) = rest.split_once(' ') {
        if head.contains(']') {
            rest = tail;
        }
    } else if rest.contains(']') {
        rest = "";
    }

    let mut hidden = false;
    match rest.split_once(' ') {
        Some((HIDDEN_MARKER, tail)) => {
            hidden = true;
            rest = tail;
        }
        None if rest == HIDDEN_MARKER => {
            hidden = true;
            rest = "";
        }
        _ => {}
    }

    if rest.is_empty() {
        (UNKNOWN_LOCATION.to_string(), hidden)
    } else {
        (rest.to_string(), hidden)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn plain_info_is_kept() {
        assert_eq!(decode_server_info("Plain info"), ("Plain info".to_string(), false));
    }

    #[test]
    fn hidden_marker_is_consumed() {
        assert_eq!(
            decode_server_info("(H) Some Server"),
            ("Some Server".to_string(), true)
        );
    }

    #[test]
    fn address_annotation_is_stripped() {
        assert_eq!(
            decode_server_info("[1.2.3.4] (H) Real Name"),
            ("Real Name".to_string(), true)
        );
        assert_eq!(
            decode_server_info("[1.2.3.4] Real Name"),
            ("Real Name".to_string(), false)
        );
    }

    #[test]
    fn empty_input_yields_placeholder() {
        assert_eq!(decode_server_info(""), (UNKNOWN_LOCATION.to_string(), false));
    }

    #[test]
    fn annotation_with_nothing_after_yields_placeholder() {
        assert_eq!(
            decode_server_info("[1.2.3.4]"),
            (UNKNOWN_LOCATION.to_string(), false)
        );
        assert_eq!(
            decode_server_info("[1.2.3.4] "),
            (UNKNOWN_LOCATION.to_string(), false)
        );
    }

    #[test]
    fn bare_hidden_marker_yields_placeholder() {
        assert_eq!(decode_server_info("(H)"), (UNKNOWN_LOCATION.to_string(), true));
        assert_eq!(decode_server_info("(H) "), (UNKNOWN_LOCATION.to_string(), true));
    }

    #[test]
    fn marker_not_in_first_position_is_text() {
        assert_eq!(
            decode_server_info("Some (H) Server"),
            ("Some (H) Server".to_string(), false)
        );
    }

    #[test]
    fn overlong_input_is_truncated() {
        let long = "x".repeat(120);
        let (display, hidden) = decode_server_info(&long);
        assert!(!hidden);
        assert_eq!(display.len(), INFO_LENGTH_MAX);
    }
}
