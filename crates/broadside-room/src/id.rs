//! Room code generation.

use broadside_protocol::RoomId;
use rand::Rng;

/// Length of a generated room code.
pub const ROOM_ID_LEN: usize = 6;

/// Uppercase letters and digits: easy to read aloud and type.
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates a random room code such as `K3ZQ7A`.
///
/// Uniqueness is not guaranteed here; the store re-rolls on collision.
pub fn random_room_id() -> RoomId {
    let mut rng = rand::rng();
    let code = (0..ROOM_ID_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    RoomId(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_room_id_has_expected_shape() {
        for _ in 0..100 {
            let id = random_room_id();
            assert_eq!(id.as_str().len(), ROOM_ID_LEN);
            assert!(
                id.as_str()
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()),
                "unexpected character in {id}"
            );
        }
    }

    #[test]
    fn test_random_room_id_varies() {
        let ids: std::collections::HashSet<_> =
            (0..50).map(|_| random_room_id()).collect();
        assert!(ids.len() > 1);
    }
}
