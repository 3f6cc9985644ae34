use std::str::FromStr;

use rand::Rng;

use crate::constants::ALL_MOVES;
use crate::error::Error;
use crate::moves::Move;

/// Parse a whitespace-separated scramble like "R U R' U' F2".
pub fn scramble_from_str(s: &str) -> Result<Vec<Move>, Error> {
    s.split_whitespace()
        .map(|word| Move::from_str(word.trim()))
        .collect()
}

/// Format a scramble as a whitespace-separated string.
pub fn scramble_to_str(s: &[Move]) -> String {
    s.iter()
        .map(Move::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Generate a random scramble of the given length in which no move repeats
/// the face of its predecessor or undoes an opposite-face pair.
pub fn gen_scramble(length: usize) -> Vec<Move> {
    let mut rng = rand::thread_rng();
    let mut scramble: Vec<Move> = Vec::with_capacity(length);
    while scramble.len() < length {
        let m = ALL_MOVES[rng.gen_range(0..ALL_MOVES.len())];
        if let Some(&prev) = scramble.last() {
            if !m.allowed_after(prev) {
                continue;
            }
        }
        scramble.push(m);
    }
    scramble
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::moves::Move::*;

    #[test]
    fn test_scramble_from_str() {
        let m = vec![R, U, R3, U3, F, L3, D3, B2, R3, U3];
        assert_eq!(scramble_from_str("R U R' U' F L' D' B2 R' U'").unwrap(), m);
        assert!(scramble_from_str("R U X").is_err());
    }

    #[test]
    fn test_scramble_to_str() {
        let m = vec![R, U, R3, U3, F, L3, D3, B2, R3, U3];
        assert_eq!(scramble_to_str(&m), "R U R' U' F L' D' B2 R' U'");
    }

    #[test]
    fn test_scramble_round_trip() {
        let m = vec![F2, D3, L, B2, U2, R3, F, D2];
        assert_eq!(scramble_from_str(&scramble_to_str(&m)).unwrap(), m);
    }

    #[test]
    fn test_gen_scramble() {
        for len in [0, 1, 20, 50] {
            let s = gen_scramble(len);
            assert_eq!(s.len(), len);
            for w in s.windows(2) {
                assert!(w[1].allowed_after(w[0]));
            }
        }
    }
}
