//! Fixed-width request tokens, boolean acknowledgements, and the room
//! listing format.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of every request token and boolean acknowledgement.
pub const TOKEN_LEN: usize = 8;

/// Positive acknowledgement for create/join requests. Clients also send it
/// back after every snapshot.
pub const TRUE_ACK: &[u8; TOKEN_LEN] = b"TTTTTTTT";

/// Negative acknowledgement for create/join requests.
pub const FALSE_ACK: &[u8; TOKEN_LEN] = b"FFFFFFFF";

/// Listing sent when no room is accepting joins.
pub const NO_ROOMS: &str = "<no games>\n";

/// Longest allowed room name.
pub const MAX_ROOM_NAME_LEN: usize = 8;

/// A request a session can issue.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Action {
    List,
    /// Followed by a room name frame.
    Create,
    /// Followed by a room name frame.
    Join,
    Exit,
    Unregister,
    /// Followed by a decimal amount frame.
    Bet,
    Hit,
    Stand,
    /// The received token was not recognized. This is not a choice a user
    /// makes; callers re-prompt or ignore it.
    None,
}

impl Action {
    const TOKENS: [(Action, &'static [u8; TOKEN_LEN]); 8] = [
        (Action::List, b"LISTGAME"),
        (Action::Create, b"CREATEGM"),
        (Action::Join, b"JOINGAME"),
        (Action::Exit, b"EXITGAME"),
        (Action::Unregister, b"UNREGIST"),
        (Action::Bet, b"BET00000"),
        (Action::Hit, b"HIT00000"),
        (Action::Stand, b"STAND000"),
    ];

    /// The wire token for this action. [`Action::None`] has no token.
    #[must_use]
    pub fn token(self) -> Option<&'static [u8; TOKEN_LEN]> {
        Self::TOKENS
            .iter()
            .find(|(action, _)| *action == self)
            .map(|(_, token)| *token)
    }

    /// Decode a received token by exact match. Anything else, including
    /// short or padded tokens, is [`Action::None`].
    #[must_use]
    pub fn decode(bytes: &[u8]) -> Self {
        Self::TOKENS
            .iter()
            .find(|(_, token)| token.as_slice() == bytes)
            .map_or(Self::None, |(action, _)| *action)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::List => "list rooms",
            Self::Create => "create room",
            Self::Join => "join room",
            Self::Exit => "exit",
            Self::Unregister => "unregister",
            Self::Bet => "bet",
            Self::Hit => "hit",
            Self::Stand => "stand",
            Self::None => "unrecognized",
        };
        write!(f, "{repr}")
    }
}

#[must_use]
pub fn encode_bool(value: bool) -> &'static [u8; TOKEN_LEN] {
    if value { TRUE_ACK } else { FALSE_ACK }
}

/// Anything other than [`TRUE_ACK`] reads as `false`.
#[must_use]
pub fn decode_bool(bytes: &[u8]) -> bool {
    bytes == TRUE_ACK
}

/// Newline-terminated room names, or [`NO_ROOMS`] when there are none.
#[must_use]
pub fn encode_room_list<S: AsRef<str>>(names: &[S]) -> String {
    if names.is_empty() {
        return NO_ROOMS.to_string();
    }
    let mut list = String::new();
    for name in names {
        list.push_str(name.as_ref());
        list.push('\n');
    }
    list
}

#[must_use]
pub fn decode_room_list(text: &str) -> Vec<String> {
    if text == NO_ROOMS {
        return Vec::new();
    }
    text.lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validate a requested room name and return its stored form.
///
/// Names are 1 to 8 printable ASCII characters without whitespace and are
/// stored lowercased.
#[must_use]
pub fn normalize_room_name(raw: &str) -> Option<String> {
    let valid = !raw.is_empty()
        && raw.len() <= MAX_ROOM_NAME_LEN
        && raw.bytes().all(|b| b.is_ascii_graphic());
    valid.then(|| raw.to_ascii_lowercase())
}

/// Parse a bet payload. Unparseable amounts read as zero so the bet is
/// rejected like any other non-positive amount.
#[must_use]
pub fn decode_amount(bytes: &[u8]) -> i64 {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|text| text.trim().parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Action Tests ===

    #[test]
    fn test_action_tokens_decode() {
        for (action, token) in Action::TOKENS {
            assert_eq!(Action::decode(token), action);
            assert_eq!(action.token(), Some(token));
        }
    }

    #[test]
    fn test_action_none_has_no_token() {
        assert_eq!(Action::None.token(), None);
    }

    #[test]
    fn test_action_decode_requires_exact_match() {
        assert_eq!(Action::decode(b"HIT"), Action::None);
        assert_eq!(Action::decode(b"hit00000"), Action::None);
        assert_eq!(Action::decode(b"STAND0000"), Action::None);
        assert_eq!(Action::decode(b""), Action::None);
        assert_eq!(Action::decode(TRUE_ACK), Action::None);
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::Stand.to_string(), "stand");
        assert_eq!(Action::None.to_string(), "unrecognized");
    }

    // === Acknowledgement Tests ===

    #[test]
    fn test_bool_acks() {
        assert!(decode_bool(encode_bool(true)));
        assert!(!decode_bool(encode_bool(false)));
        assert!(!decode_bool(b"TTTT"));
    }

    // === Room Listing Tests ===

    #[test]
    fn test_empty_listing_uses_sentinel() {
        let empty: [&str; 0] = [];
        assert_eq!(encode_room_list(&empty), "<no games>\n");
        assert!(decode_room_list(NO_ROOMS).is_empty());
    }

    #[test]
    fn test_listing_is_newline_terminated() {
        assert_eq!(encode_room_list(&["alpha", "beta"]), "alpha\nbeta\n");
        assert_eq!(decode_room_list("alpha\nbeta\n"), vec!["alpha", "beta"]);
    }

    // === Room Name Tests ===

    #[test]
    fn test_room_name_is_lowercased() {
        assert_eq!(normalize_room_name("Table1"), Some("table1".to_string()));
    }

    #[test]
    fn test_room_name_length_bounds() {
        assert_eq!(normalize_room_name(""), None);
        assert_eq!(normalize_room_name("abcdefgh"), Some("abcdefgh".to_string()));
        assert_eq!(normalize_room_name("abcdefghi"), None);
    }

    #[test]
    fn test_room_name_rejects_whitespace_and_non_ascii() {
        assert_eq!(normalize_room_name("a b"), None);
        assert_eq!(normalize_room_name("room\n"), None);
        assert_eq!(normalize_room_name("café"), None);
    }

    // === Amount Tests ===

    #[test]
    fn test_decode_amount() {
        assert_eq!(decode_amount(b"25"), 25);
        assert_eq!(decode_amount(b"-3"), -3);
        assert_eq!(decode_amount(b"ten"), 0);
        assert_eq!(decode_amount(b""), 0);
    }
}
