use std::{fmt, str::FromStr};

use self::Move::*;
use crate::constants::*;
use crate::cubie::{Corner::*, CubieCube, Edge::*};
use crate::error::Error;
use crate::facelet::Color;

/// Layer moves: Up, Right, Front, Down, Left, Back.
///
/// $ clockwise, $2 double, $3 counter-clockwise.
#[rustfmt::skip]
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Move {
    U, U2, U3,
    R, R2, R3,
    F, F2, F3,
    D, D2, D3,
    L, L2, L3,
    B, B2, B3,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            U3 => write!(f, "U'"),
            R3 => write!(f, "R'"),
            F3 => write!(f, "F'"),
            D3 => write!(f, "D'"),
            L3 => write!(f, "L'"),
            B3 => write!(f, "B'"),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl FromStr for Move {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "U" => Ok(U),
            "U'" => Ok(U3),
            "U2" => Ok(U2),
            "R" => Ok(R),
            "R'" => Ok(R3),
            "R2" => Ok(R2),
            "F" => Ok(F),
            "F'" => Ok(F3),
            "F2" => Ok(F2),
            "D" => Ok(D),
            "D'" => Ok(D3),
            "D2" => Ok(D2),
            "L" => Ok(L),
            "L'" => Ok(L3),
            "L2" => Ok(L2),
            "B" => Ok(B),
            "B'" => Ok(B3),
            "B2" => Ok(B2),
            _ => Err(Error::InvalidScramble),
        }
    }
}

impl Move {
    /// The face this move turns.
    pub fn face(self) -> Color {
        ALL_FACES[self as usize / 3]
    }

    /// Clockwise quarter turns, in {1, 2, 3}.
    pub fn turns(self) -> u8 {
        (self as usize % 3 + 1) as u8
    }

    /// Build a move from a face and any quarter-turn count. The count is
    /// reduced modulo 4; a reduced count of 0 is the identity and gives None.
    pub fn make(face: Color, turns: i32) -> Option<Self> {
        match turns.rem_euclid(4) {
            0 => None,
            t => Some(ALL_MOVES[3 * face as usize + t as usize - 1]),
        }
    }

    /// The move undoing this one.
    pub fn inverse(self) -> Self {
        ALL_MOVES[(self as usize / 3) * 3 + (2 - self as usize % 3)]
    }

    /// Whether this move may follow `prev` in a canonical sequence.
    ///
    /// Successive moves on the same face are forbidden, and of the opposite
    /// face pairs only U-then-D, R-then-L and F-then-B are explored.
    pub fn allowed_after(self, prev: Move) -> bool {
        let diff = prev as i8 / 3 - self as i8 / 3;
        diff != 0 && diff != 3
    }
}

/// Fold runs of same-face moves with quarter-turn addition modulo 4 and
/// drop the resulting identities, until no two neighbors share a face.
pub fn simplify(moves: &[Move]) -> Vec<Move> {
    let mut out: Vec<Move> = Vec::with_capacity(moves.len());
    for &m in moves {
        match out.last() {
            Some(&prev) if prev.face() == m.face() => {
                out.pop();
                if let Some(folded) = Move::make(prev.face(), (prev.turns() + m.turns()) as i32) {
                    out.push(folded);
                }
            }
            _ => out.push(m),
        }
    }
    out
}

/// The basic six cube moves described by permutations and changes in orientation.
///
/// U_MOVE
pub const U_MOVE: CubieCube = CubieCube {
    cp: [UBR, URF, UFL, ULB, DFR, DLF, DBL, DRB],
    co: [0, 0, 0, 0, 0, 0, 0, 0],
    ep: [UB, UR, UF, UL, DR, DF, DL, DB, FR, FL, BL, BR],
    eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
};

/// The basic six cube moves described by permutations and changes in orientation.
///
/// R_MOVE
pub const R_MOVE: CubieCube = CubieCube {
    cp: [DFR, UFL, ULB, URF, DRB, DLF, DBL, UBR], //permutation of the corners
    co: [2, 0, 0, 1, 1, 0, 0, 2],                 //changes of the orientations of the corners
    ep: [FR, UF, UL, UB, BR, DF, DL, DB, DR, FL, BL, UR], //permutation of the edges
    eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],     //changes of the orientations of the edges
};

/// The basic six cube moves described by permutations and changes in orientation.
///
/// F_MOVE
pub const F_MOVE: CubieCube = CubieCube {
    cp: [UFL, DLF, ULB, UBR, URF, DFR, DBL, DRB],
    co: [1, 2, 0, 0, 2, 1, 0, 0],
    ep: [UR, FL, UL, UB, DR, FR, DL, DB, UF, DF, BL, BR],
    eo: [0, 1, 0, 0, 0, 1, 0, 0, 1, 1, 0, 0],
};

/// The basic six cube moves described by permutations and changes in orientation.
///
/// D_MOVE
pub const D_MOVE: CubieCube = CubieCube {
    cp: [URF, UFL, ULB, UBR, DLF, DBL, DRB, DFR],
    co: [0, 0, 0, 0, 0, 0, 0, 0],
    ep: [UR, UF, UL, UB, DF, DL, DB, DR, FR, FL, BL, BR],
    eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
};

/// The basic six cube moves described by permutations and changes in orientation.
///
/// L_MOVE
pub const L_MOVE: CubieCube = CubieCube {
    cp: [URF, ULB, DBL, UBR, DFR, UFL, DLF, DRB],
    co: [0, 1, 2, 0, 0, 2, 1, 0],
    ep: [UR, UF, BL, UB, DR, DF, FL, DB, FR, UL, DL, BR],
    eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
};

/// The basic six cube moves described by permutations and changes in orientation.
///
/// B_MOVE
pub const B_MOVE: CubieCube = CubieCube {
    cp: [URF, UFL, UBR, DRB, DFR, DLF, ULB, DBL],
    co: [0, 0, 1, 2, 0, 0, 2, 1],
    ep: [UR, UF, UL, BR, DR, DF, DL, BL, FR, FL, UB, DB],
    eo: [0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 1, 1],
};

/// The six basic move cubes indexed by face.
pub const BASIC_MOVE_CUBES: [CubieCube; 6] = [U_MOVE, R_MOVE, F_MOVE, D_MOVE, L_MOVE, B_MOVE];

lazy_static! {
    /// The 18 move cubes indexed by `Move`.
    static ref MOVE_CUBES: [CubieCube; 18] = {
        let mut cubes = [CubieCube::default(); 18];
        for (i, c) in cubes.iter_mut().enumerate() {
            let basic = BASIC_MOVE_CUBES[i / 3];
            for _ in 0..i % 3 + 1 {
                c.multiply(&basic);
            }
        }
        cubes
    };
    static ref MOVE_TABLES: MoveTables = MoveTables::new();
}

/// The cube effecting a single quarter turn of the given face.
pub fn basic_move_cube(face: Color) -> &'static CubieCube {
    &BASIC_MOVE_CUBES[face as usize]
}

/// The cube effecting the given move.
pub fn move_cube(m: Move) -> CubieCube {
    MOVE_CUBES[m as usize]
}

/// Move tables: for every coordinate value and move, the coordinate after
/// that move. Built once per process from the basic move cubes and shared
/// read-only.
pub struct MoveTables {
    pub twist_move: Vec<u16>,
    pub flip_move: Vec<u16>,
    pub slice_move: Vec<u16>,
    pub corners_move: Vec<u16>,
    pub ud_edges_move: Vec<u16>,
    pub slice_perm_move: Vec<u16>,
}

impl MoveTables {
    pub fn new() -> Self {
        Self {
            twist_move: build_twist_move(),
            flip_move: build_flip_move(),
            slice_move: build_slice_move(),
            corners_move: build_corners_move(),
            ud_edges_move: build_ud_edges_move(),
            slice_perm_move: build_slice_perm_move(),
        }
    }

    /// The process-wide immutable instance.
    pub fn shared() -> &'static MoveTables {
        &MOVE_TABLES
    }

    #[inline]
    pub fn twist(&self, c: u16, m: Move) -> u16 {
        self.twist_move[N_MOVE * c as usize + m as usize]
    }

    #[inline]
    pub fn flip(&self, c: u16, m: Move) -> u16 {
        self.flip_move[N_MOVE * c as usize + m as usize]
    }

    #[inline]
    pub fn slice(&self, c: u16, m: Move) -> u16 {
        self.slice_move[N_MOVE * c as usize + m as usize]
    }

    #[inline]
    pub fn corners(&self, c: u16, m: Move) -> u16 {
        self.corners_move[N_MOVE * c as usize + m as usize]
    }

    /// Valid only for phase-2 moves on phase-2 states.
    #[inline]
    pub fn ud_edges(&self, c: u16, m: Move) -> u16 {
        self.ud_edges_move[N_MOVE * c as usize + m as usize]
    }

    /// Valid only for phase-2 moves on phase-2 states.
    #[inline]
    pub fn slice_perm(&self, c: u16, m: Move) -> u16 {
        self.slice_perm_move[N_MOVE * c as usize + m as usize]
    }
}

impl Default for MoveTables {
    fn default() -> Self {
        Self::new()
    }
}

/// Move table for the twist of the corners, 2187 x 18.
fn build_twist_move() -> Vec<u16> {
    let mut table = vec![0; N_TWIST * N_MOVE];
    let mut a = CubieCube::default();
    for i in 0..N_TWIST {
        a.set_twist(i as u16);
        for (j, face) in ALL_FACES.iter().enumerate() {
            let bc = basic_move_cube(*face);
            for k in 0..3 {
                a.corner_multiply(bc);
                table[N_MOVE * i + 3 * j + k] = a.get_twist();
            }
            a.corner_multiply(bc); // 4. move restores the face
        }
    }
    table
}

/// Move table for the flip of the edges, 2048 x 18.
fn build_flip_move() -> Vec<u16> {
    let mut table = vec![0; N_FLIP * N_MOVE];
    let mut a = CubieCube::default();
    for i in 0..N_FLIP {
        a.set_flip(i as u16);
        for (j, face) in ALL_FACES.iter().enumerate() {
            let bc = basic_move_cube(*face);
            for k in 0..3 {
                a.edge_multiply(bc);
                table[N_MOVE * i + 3 * j + k] = a.get_flip();
            }
            a.edge_multiply(bc);
        }
    }
    table
}

/// Move table for the placement of the FR, FL, BL, BR edges, 495 x 18.
fn build_slice_move() -> Vec<u16> {
    let mut table = vec![0; N_SLICE * N_MOVE];
    let mut a = CubieCube::default();
    for i in 0..N_SLICE {
        a.set_slice(i as u16);
        for (j, face) in ALL_FACES.iter().enumerate() {
            let bc = basic_move_cube(*face);
            for k in 0..3 {
                a.edge_multiply(bc);
                table[N_MOVE * i + 3 * j + k] = a.get_slice();
            }
            a.edge_multiply(bc);
        }
    }
    table
}

/// Move table for the corner permutation, 40320 x 18.
fn build_corners_move() -> Vec<u16> {
    let mut table = vec![0; N_CORNERS * N_MOVE];
    let mut a = CubieCube::default();
    for i in 0..N_CORNERS {
        a.set_corners(i as u16);
        for (j, face) in ALL_FACES.iter().enumerate() {
            let bc = basic_move_cube(*face);
            for k in 0..3 {
                a.corner_multiply(bc);
                table[N_MOVE * i + 3 * j + k] = a.get_corners();
            }
            a.corner_multiply(bc);
        }
    }
    table
}

/// Move table for the permutation of the eight U/D edges, 40320 x 18.
///
/// Entries exist only for the ten phase-2 moves; the coordinate is not
/// defined outside the subgroup.
fn build_ud_edges_move() -> Vec<u16> {
    let mut table = vec![0; N_UD_EDGES * N_MOVE];
    let mut a = CubieCube::default();
    for i in 0..N_UD_EDGES {
        a.set_ud_edges(i as u16);
        for (j, face) in ALL_FACES.iter().enumerate() {
            let bc = basic_move_cube(*face);
            for k in 0..3 {
                a.edge_multiply(bc);
                let m = ALL_MOVES[3 * j + k];
                if PHASE2_MOVES.contains(&m) {
                    table[N_MOVE * i + 3 * j + k] = a.get_ud_edges();
                }
            }
            a.edge_multiply(bc);
        }
    }
    table
}

/// Move table for the permutation of the slice edges, 24 x 18.
///
/// Entries exist only for the ten phase-2 moves.
fn build_slice_perm_move() -> Vec<u16> {
    let mut table = vec![0; N_PERM_4 * N_MOVE];
    let mut a = CubieCube::default();
    for i in 0..N_PERM_4 {
        a.set_slice_perm(i as u16);
        for (j, face) in ALL_FACES.iter().enumerate() {
            let bc = basic_move_cube(*face);
            for k in 0..3 {
                a.edge_multiply(bc);
                let m = ALL_MOVES[3 * j + k];
                if PHASE2_MOVES.contains(&m) {
                    table[N_MOVE * i + 3 * j + k] = a.get_slice_perm();
                }
            }
            a.edge_multiply(bc);
        }
    }
    table
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_face_turns_make() {
        assert_eq!(R2.face(), Color::R);
        assert_eq!(R2.turns(), 2);
        assert_eq!(Move::make(Color::R, 2), Some(R2));
        assert_eq!(Move::make(Color::U, -1), Some(U3));
        assert_eq!(Move::make(Color::F, 7), Some(F3));
        assert_eq!(Move::make(Color::B, 4), None);
        assert_eq!(Move::make(Color::L, 0), None);
        for m in ALL_MOVES {
            assert_eq!(Move::make(m.face(), m.turns() as i32), Some(m));
        }
    }

    #[test]
    fn test_inverse() {
        assert_eq!(U.inverse(), U3);
        assert_eq!(U2.inverse(), U2);
        assert_eq!(B3.inverse(), B);
        for m in ALL_MOVES {
            assert_eq!(m.inverse().inverse(), m);
        }
    }

    #[test]
    fn test_allowed_after() {
        // same face forbidden
        assert!(!U2.allowed_after(U));
        assert!(!R.allowed_after(R3));
        // opposite faces only in one order
        assert!(D.allowed_after(U));
        assert!(!U.allowed_after(D));
        assert!(L2.allowed_after(R));
        assert!(!R2.allowed_after(L));
        assert!(B.allowed_after(F2));
        assert!(!F.allowed_after(B));
        // unrelated faces always allowed
        assert!(F.allowed_after(U));
        assert!(U.allowed_after(L3));
    }

    #[test]
    fn test_parse_display() {
        use std::str::FromStr;
        for m in ALL_MOVES {
            assert_eq!(Move::from_str(&m.to_string()).unwrap(), m);
        }
        assert!(Move::from_str("X").is_err());
        assert!(Move::from_str("U4").is_err());
    }

    #[test]
    fn test_simplify() {
        assert_eq!(simplify(&[U, U]), vec![U2]);
        assert_eq!(simplify(&[U, U3]), vec![]);
        assert_eq!(simplify(&[U, U2, R]), vec![U3, R]);
        assert_eq!(simplify(&[R, L, L3, R]), vec![R2]);
        assert_eq!(simplify(&[R2, L2, L2, R2]), vec![]);
        assert_eq!(simplify(&[F, B2, F]), vec![F, B2, F]);
        let s = simplify(&[U, R, R, R, U3, D]);
        assert_eq!(s, vec![U, R3, U3, D]);
        for w in s.windows(2) {
            assert_ne!(w[0].face(), w[1].face());
        }
    }

    #[test]
    fn test_move_cubes() {
        assert_eq!(move_cube(R), R_MOVE);
        let mut r2 = R_MOVE;
        r2.multiply(&R_MOVE);
        assert_eq!(move_cube(R2), r2);
        for m in ALL_MOVES {
            let mut undone = move_cube(m);
            undone.multiply(&move_cube(m.inverse()));
            assert!(undone.is_solved());
        }
    }

    #[test]
    fn test_move_tables_match_cubie_level() {
        let mt = MoveTables::shared();
        for seed in [
            vec![R, U, F3, L, D2, B],
            vec![U, F3, D3, F2, D, B2, D3, R2, U3, F2, R2],
        ] {
            let cc = CubieCube::from(&seed);
            for m in ALL_MOVES {
                let next = cc.apply_move(m);
                assert_eq!(mt.twist(cc.get_twist(), m), next.get_twist());
                assert_eq!(mt.flip(cc.get_flip(), m), next.get_flip());
                assert_eq!(mt.slice(cc.get_slice(), m), next.get_slice());
                assert_eq!(mt.corners(cc.get_corners(), m), next.get_corners());
            }
        }
    }

    #[test]
    fn test_phase2_move_tables_match_cubie_level() {
        let mt = MoveTables::shared();
        // phase-2 sequences keep the cube inside the subgroup
        for seed in [
            vec![U, R2, D3, F2, L2, U2, B2, D],
            vec![B2, U3, L2, D2, R2, F2],
        ] {
            let cc = CubieCube::from(&seed);
            for m in PHASE2_MOVES {
                let next = cc.apply_move(m);
                assert_eq!(mt.ud_edges(cc.get_ud_edges(), m), next.get_ud_edges());
                assert_eq!(mt.slice_perm(cc.get_slice_perm(), m), next.get_slice_perm());
            }
        }
    }
}
