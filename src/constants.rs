use crate::cubie::Corner::{self, *};
use crate::cubie::Edge::{self, *};
use crate::facelet::Color;
use crate::moves::Move::{self, *};

pub const ALL_CORNERS: [Corner; 8] = [URF, UFL, ULB, UBR, DFR, DLF, DBL, DRB];
pub const ALL_EDGES: [Edge; 12] = [UR, UF, UL, UB, DR, DF, DL, DB, FR, FL, BL, BR];
pub const ALL_FACES: [Color; 6] = [Color::U, Color::R, Color::F, Color::D, Color::L, Color::B];
pub const ALL_MOVES: [Move; 18] = [
    U, U2, U3, R, R2, R3, F, F2, F3, D, D2, D3, L, L2, L3, B, B2, B3,
];
/// The ten moves that stay inside the subgroup <U, D, L2, R2, F2, B2>.
pub const PHASE2_MOVES: [Move; 10] = [U, U2, U3, R2, F2, D, D2, D3, L2, B2];

pub const SOLVED: u16 = 0;

/// number of possible face moves
pub const N_MOVE: usize = 18;
/// 3^7 possible corner orientations
pub const N_TWIST: usize = 2187;
/// 2^11 possible edge orientations
pub const N_FLIP: usize = 2048;
/// Binomial(12,4) placements of the FR, FL, BL, BR edges, permutation ignored
pub const N_SLICE: usize = 495;
/// 4! permutations of the FR, FL, BL, BR edges inside their slice
pub const N_PERM_4: usize = 24;
/// 8! permutations of the corners
pub const N_CORNERS: usize = 40320;
/// 8! permutations of the edges UR..DB in phase 2
pub const N_UD_EDGES: usize = 40320;
/// 12*11*10*9*8*7 placements of a tracked group of 6 edges
pub const N_EDGE6_PERM: usize = 665_280;
/// 2^6 orientations of a tracked group of 6 edges
pub const N_EDGE6_FLIP: usize = 64;
/// corner permutation x corner orientation, the Korf corner database domain
pub const N_CORNER_STATES: usize = N_CORNERS * N_TWIST;
/// tracked-6-edge placements x orientations, one Korf edge database domain
pub const N_EDGE6_STATES: usize = N_EDGE6_PERM * N_EDGE6_FLIP;

/// Most worker threads a solver accepts.
pub const MAX_THREADS: usize = 32;
