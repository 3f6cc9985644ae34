use std::fmt;

use crate::cubie::CubieCube;
use crate::error::Error;

/// The six face colors, also used as the face tag of a move.
///
/// The order U, R, F, D, L, B matches the facelet string layout.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Color {
    U,
    R,
    F,
    D,
    L,
    B,
}

impl TryFrom<char> for Color {
    type Error = Error;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'U' => Ok(Color::U),
            'R' => Ok(Color::R),
            'F' => Ok(Color::F),
            'D' => Ok(Color::D),
            'L' => Ok(Color::L),
            'B' => Ok(Color::B),
            _ => Err(Error::InvalidFacelet),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Map of corner positions to facelet positions.
#[rustfmt::skip]
pub const CORNER_FACELET: [[usize; 3]; 8] = [
    [8, 9, 20],   // URF
    [6, 18, 38],  // UFL
    [0, 36, 47],  // ULB
    [2, 45, 11],  // UBR
    [29, 26, 15], // DFR
    [27, 44, 24], // DLF
    [33, 53, 42], // DBL
    [35, 17, 51], // DRB
];

/// Map of edge positions to facelet positions.
#[rustfmt::skip]
pub const EDGE_FACELET: [[usize; 2]; 12] = [
    [5, 10],  // UR
    [7, 19],  // UF
    [3, 37],  // UL
    [1, 46],  // UB
    [32, 16], // DR
    [28, 25], // DF
    [30, 43], // DL
    [34, 52], // DB
    [23, 12], // FR
    [21, 41], // FL
    [50, 39], // BL
    [48, 14], // BR
];

/// Map of corner positions to sticker colors.
#[rustfmt::skip]
pub const CORNER_COLOR: [[Color; 3]; 8] = [
    [Color::U, Color::R, Color::F],
    [Color::U, Color::F, Color::L],
    [Color::U, Color::L, Color::B],
    [Color::U, Color::B, Color::R],
    [Color::D, Color::F, Color::R],
    [Color::D, Color::L, Color::F],
    [Color::D, Color::B, Color::L],
    [Color::D, Color::R, Color::B],
];

/// Map of edge positions to sticker colors.
#[rustfmt::skip]
pub const EDGE_COLOR: [[Color; 2]; 12] = [
    [Color::U, Color::R],
    [Color::U, Color::F],
    [Color::U, Color::L],
    [Color::U, Color::B],
    [Color::D, Color::R],
    [Color::D, Color::F],
    [Color::D, Color::L],
    [Color::D, Color::B],
    [Color::F, Color::R],
    [Color::F, Color::L],
    [Color::B, Color::L],
    [Color::B, Color::R],
];

/// Cube on the facelet level.
///
/// The 54 stickers are listed face by face in the order U, R, F, D, L, B,
/// each face row by row as seen looking at that face.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct FaceCube {
    pub f: [Color; 54],
}

impl Default for FaceCube {
    fn default() -> Self {
        let mut f = [Color::U; 54];
        for (i, c) in f.iter_mut().enumerate() {
            *c = crate::constants::ALL_FACES[i / 9];
        }
        Self { f }
    }
}

impl TryFrom<&str> for FaceCube {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.len() != 54 {
            return Err(Error::InvalidFacelet);
        }
        let mut f = [Color::U; 54];
        let mut count = [0usize; 6];
        for (i, ch) in value.chars().enumerate() {
            let color = Color::try_from(ch)?;
            f[i] = color;
            count[color as usize] += 1;
        }
        if count != [9; 6] {
            return Err(Error::InvalidFacelet);
        }
        // fixed orientation: the centers must sit on their own faces
        for (i, face) in crate::constants::ALL_FACES.iter().enumerate() {
            if f[9 * i + 4] != *face {
                return Err(Error::InvalidFacelet);
            }
        }
        Ok(Self { f })
    }
}

/// Gives the facelet representation of a cubie cube.
impl From<&CubieCube> for FaceCube {
    fn from(cc: &CubieCube) -> Self {
        let mut fc = FaceCube::default();
        for i in 0..8 {
            let j = cc.cp[i] as usize;
            let ori = cc.co[i] as usize;
            for k in 0..3 {
                fc.f[CORNER_FACELET[i][(k + ori) % 3]] = CORNER_COLOR[j][k];
            }
        }
        for i in 0..12 {
            let j = cc.ep[i] as usize;
            let ori = cc.eo[i] as usize;
            for k in 0..2 {
                fc.f[EDGE_FACELET[i][(k + ori) % 2]] = EDGE_COLOR[j][k];
            }
        }
        fc
    }
}

impl fmt::Display for FaceCube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.f {
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_solved_string() {
        let fc = FaceCube::default();
        assert_eq!(
            fc.to_string(),
            "UUUUUUUUURRRRRRRRRFFFFFFFFFDDDDDDDDDLLLLLLLLLBBBBBBBBB"
        );
        let parsed = FaceCube::try_from(fc.to_string().as_str()).unwrap();
        assert_eq!(parsed, fc);
    }

    #[test]
    fn test_parse_rejects() {
        // too short
        assert!(FaceCube::try_from("UUU").is_err());
        // bad character
        let mut s = FaceCube::default().to_string();
        s.replace_range(0..1, "X");
        assert!(FaceCube::try_from(s.as_str()).is_err());
        // color counts off (swap one sticker without its partner)
        let mut s = FaceCube::default().to_string();
        s.replace_range(0..1, "R");
        assert!(FaceCube::try_from(s.as_str()).is_err());
    }

    #[test]
    fn test_scrambled_round_trip() {
        let s = "RLLBUFUUUBDURRBBUBRLRRFDFDDLLLUDFLRRDDFRLFDBUBFFLBBDUF";
        let fc = FaceCube::try_from(s).unwrap();
        assert_eq!(fc.to_string(), s);
    }
}
