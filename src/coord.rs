use crate::constants::*;
use crate::cubie::CubieCube;
use crate::error::Error;

/// A cube on the phase-1 coordinate level.
///
/// A state is mapped to the three coordinates twist, flip and slice; all
/// three are 0 exactly when the state lies in the subgroup
/// <U, D, L2, R2, F2, B2>.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct CoordCube {
    pub twist: u16,
    pub flip: u16,
    pub slice: u16,
}

impl CoordCube {
    /// Build the phase-1 coordinates of a cubie cube, rejecting states that
    /// break a solvability invariant.
    pub fn from_cubie(cc: &CubieCube) -> Result<Self, Error> {
        cc.verify()?;
        Ok(Self {
            twist: cc.get_twist(),
            flip: cc.get_flip(),
            slice: cc.get_slice(),
        })
    }

    /// Whether the state is inside the phase-2 subgroup.
    pub fn in_subgroup(&self) -> bool {
        self.twist == SOLVED && self.flip == SOLVED && self.slice == SOLVED
    }
}

/// A subgroup cube on the phase-2 coordinate level.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Phase2Coord {
    pub corners: u16,
    pub ud_edges: u16,
    pub slice_perm: u16,
}

impl Phase2Coord {
    /// Build the phase-2 coordinates. The cube must be inside the subgroup
    /// (twist, flip and slice all 0).
    pub fn from_cubie(cc: &CubieCube) -> Self {
        debug_assert_eq!(cc.get_slice(), SOLVED);
        Self {
            corners: cc.get_corners(),
            ud_edges: cc.get_ud_edges(),
            slice_perm: cc.get_slice_perm(),
        }
    }

    pub fn is_solved(&self) -> bool {
        self.corners == SOLVED && self.ud_edges == SOLVED && self.slice_perm == SOLVED
    }
}

/// The six edges UR, UF, UL, UB, DR, DF tracked by the first edge database.
pub const FIRST_EDGE_BASE: usize = 0;
/// The six edges DL, DB, FR, FL, BL, BR tracked by the second edge database.
pub const LAST_EDGE_BASE: usize = 6;

/// Pattern-database index of the corner permutation and orientation,
/// 0 <= index < 8! * 3^7.
pub fn corner_index(cc: &CubieCube) -> usize {
    cc.get_corners() as usize * N_TWIST + cc.get_twist() as usize
}

/// A representative state for a corner database index. Edges stay solved.
pub fn corner_state(ix: usize) -> CubieCube {
    let mut cc = CubieCube::default();
    cc.set_corners((ix / N_TWIST) as u16);
    cc.set_twist((ix % N_TWIST) as u16);
    cc
}

/// Pattern-database index of the placement and orientation of a tracked
/// group of six edges, 0 <= index < 12*11*10*9*8*7 * 2^6.
///
/// `base` selects the group: the edges with enum indices base..base+6.
pub fn edge6_index(cc: &CubieCube, base: usize) -> usize {
    let mut pos = [0usize; 6];
    let mut ori = [0u8; 6];
    for p in 0..12 {
        let e = cc.ep[p] as usize;
        if e >= base && e < base + 6 {
            pos[e - base] = p;
            ori[e - base] = cc.eo[p];
        }
    }
    let mut idx = 0;
    for i in 0..6 {
        // rank of pos[i] among the positions not taken by earlier tracked edges
        let mut r = pos[i];
        for j in 0..i {
            if pos[j] < pos[i] {
                r -= 1;
            }
        }
        idx = idx * (12 - i) + r;
    }
    let mut flip = 0;
    for o in ori {
        flip = 2 * flip + o as usize;
    }
    idx * N_EDGE6_FLIP + flip
}

/// A representative state for an edge database index: the tracked edges in
/// their encoded placement, the untracked edges parked on the free positions.
pub fn edge6_state(ix: usize, base: usize) -> CubieCube {
    let flip = ix % N_EDGE6_FLIP;
    let mut idx = ix / N_EDGE6_FLIP;
    let mut digits = [0usize; 6];
    for i in (0..6).rev() {
        digits[i] = idx % (12 - i);
        idx /= 12 - i;
    }
    let mut cc = CubieCube::default();
    let mut free: Vec<usize> = (0..12).collect();
    let mut used = [false; 12];
    for i in 0..6 {
        let p = free.remove(digits[i]);
        cc.ep[p] = ALL_EDGES[base + i];
        cc.eo[p] = ((flip >> (5 - i)) & 1) as u8;
        used[p] = true;
    }
    let mut k = 0;
    for p in 0..12 {
        if !used[p] {
            cc.ep[p] = ALL_EDGES[(base + 6 + k) % 12];
            cc.eo[p] = 0;
            k += 1;
        }
    }
    cc
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::moves::Move::*;

    #[test]
    fn test_coord_cube() {
        let solved = CoordCube::from_cubie(&CubieCube::default()).unwrap();
        assert_eq!(
            solved,
            CoordCube {
                twist: 0,
                flip: 0,
                slice: 0
            }
        );
        assert!(solved.in_subgroup());

        let f = CubieCube::default().apply_move(F);
        let c = CoordCube::from_cubie(&f).unwrap();
        assert!(!c.in_subgroup());
        assert!(c.twist < N_TWIST as u16);
        assert!(c.flip < N_FLIP as u16);
        assert!(c.slice < N_SLICE as u16);

        let mut bad = CubieCube::default();
        bad.co[0] = 2;
        assert!(CoordCube::from_cubie(&bad).is_err());
    }

    #[test]
    fn test_phase2_coord_round_trip() {
        let cc = CubieCube::from(&vec![U, R2, D3, F2, L2, U2, B2, D, R2, U3]);
        let p2 = Phase2Coord::from_cubie(&cc);
        assert!(p2.corners < N_CORNERS as u16);
        assert!(p2.ud_edges < N_UD_EDGES as u16);
        assert!(p2.slice_perm < N_PERM_4 as u16);

        // a subgroup state is fully determined by its phase-2 coordinates
        let mut back = CubieCube::default();
        back.set_corners(p2.corners);
        back.set_ud_edges(p2.ud_edges);
        back.set_slice_perm(p2.slice_perm);
        assert_eq!(back, cc);

        assert!(Phase2Coord::from_cubie(&CubieCube::default()).is_solved());
    }

    #[test]
    fn test_coordinate_setters_invert_getters() {
        let cc = CubieCube::from(&vec![R, U, R3, U3, F, L3, D3, B2, R3, U3, F2, D]);

        let mut a = CubieCube::default();
        a.set_twist(cc.get_twist());
        assert_eq!(a.co, cc.co);

        let mut a = CubieCube::default();
        a.set_flip(cc.get_flip());
        assert_eq!(a.eo, cc.eo);

        let mut a = CubieCube::default();
        a.set_corners(cc.get_corners());
        assert_eq!(a.cp, cc.cp);

        // slice placement: the set of slice positions survives the round trip
        let mut a = CubieCube::default();
        a.set_slice(cc.get_slice());
        let slice_positions = |c: &CubieCube| {
            let mut v = [false; 12];
            for p in 0..12 {
                v[p] = c.ep[p] as usize >= 8;
            }
            v
        };
        assert_eq!(slice_positions(&a), slice_positions(&cc));
    }

    #[test]
    fn test_coordinate_encoders_cover_domain() {
        // encode(decode(c)) == c over the small domains
        let mut a = CubieCube::default();
        for c in 0..N_TWIST as u16 {
            a.set_twist(c);
            assert_eq!(a.get_twist(), c);
        }
        for c in 0..N_FLIP as u16 {
            a.set_flip(c);
            assert_eq!(a.get_flip(), c);
        }
        for c in 0..N_SLICE as u16 {
            a.set_slice(c);
            assert_eq!(a.get_slice(), c);
        }
        for c in 0..N_PERM_4 as u16 {
            a.set_slice_perm(c);
            assert_eq!(a.get_slice_perm(), c);
        }
        for c in (0..N_CORNERS as u16).step_by(7) {
            a.set_corners(c);
            assert_eq!(a.get_corners(), c);
        }
        for c in (0..N_UD_EDGES as u16).step_by(7) {
            a.set_ud_edges(c);
            assert_eq!(a.get_ud_edges(), c);
        }
    }

    #[test]
    fn test_corner_index_round_trip() {
        assert_eq!(corner_index(&CubieCube::default()), 0);
        for ix in [0usize, 1, 2186, 2187, 1_000_000, N_CORNER_STATES - 1] {
            assert_eq!(corner_index(&corner_state(ix)), ix);
        }
        let scrambled = CubieCube::from(&vec![R, U2, F3, D, L2, B]);
        let ix = corner_index(&scrambled);
        let back = corner_state(ix);
        assert_eq!(back.cp, scrambled.cp);
        assert_eq!(back.co, scrambled.co);
    }

    #[test]
    fn test_edge6_index_round_trip() {
        assert_eq!(edge6_index(&CubieCube::default(), FIRST_EDGE_BASE), 0);
        for base in [FIRST_EDGE_BASE, LAST_EDGE_BASE] {
            for ix in [0usize, 1, 63, 64, 12345, 7_654_321, N_EDGE6_STATES - 1] {
                assert_eq!(edge6_index(&edge6_state(ix, base), base), ix);
            }
        }
    }

    #[test]
    fn test_edge6_tracks_scrambled_state() {
        let scrambled = CubieCube::from(&vec![R, U, F3, L, D2, B, U2, R3]);
        for base in [FIRST_EDGE_BASE, LAST_EDGE_BASE] {
            let back = edge6_state(edge6_index(&scrambled, base), base);
            // the tracked edges sit on the same positions with the same flip
            for p in 0..12 {
                let e = scrambled.ep[p] as usize;
                if e >= base && e < base + 6 {
                    assert_eq!(back.ep[p], scrambled.ep[p]);
                    assert_eq!(back.eo[p], scrambled.eo[p]);
                }
            }
        }
    }
}
