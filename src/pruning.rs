use std::path::Path;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::thread;

use crate::constants::*;
use crate::coord::{corner_index, corner_state, edge6_index, edge6_state, FIRST_EDGE_BASE, LAST_EDGE_BASE};
use crate::cubie::CubieCube;
use crate::error::Error;
use crate::moves::{move_cube, MoveTables};
use crate::persist::{
    self, TableSpec, KOCIEMBA_MAGIC, KROF_MAGIC, TABLE_KROF_CORNERS, TABLE_KROF_FIRST_EDGES,
    TABLE_KROF_LAST_EDGES, TABLE_PHASE1_FLIPSLICE, TABLE_PHASE1_TWIST, TABLE_PHASE2_CORNSLICE,
    TABLE_PHASE2_EDGESLICE,
};

/// Nibble value marking an entry that is not filled: depth >= 15.
pub const EMPTY: u8 = 0x0F;

/// A packed array of 4-bit distances, low nibble first.
///
/// Immutable after construction and safe to share across threads without
/// synchronization. A stored 0xF means "depth at least 15" and must only be
/// used as a lower bound.
pub struct NibbleTable {
    len: usize,
    data: Vec<u8>,
}

impl NibbleTable {
    /// Wrap raw nibble data. `data` must hold ceil(len/2) bytes.
    pub fn from_raw(len: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), (len + 1) / 2);
        Self { len, data }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The raw packed bytes, as stored on disk.
    pub fn raw(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn get(&self, ix: usize) -> u8 {
        (self.data[ix >> 1] >> ((ix & 1) * 4)) & 0x0F
    }
}

/// Write side of a table under construction: a nibble array with atomic
/// per-byte compare-and-swap, so flood passes may run on several threads.
struct NibbleBuilder {
    len: usize,
    cells: Vec<AtomicU8>,
}

impl NibbleBuilder {
    fn new(len: usize) -> Self {
        let mut cells = Vec::with_capacity((len + 1) / 2);
        cells.resize_with((len + 1) / 2, || AtomicU8::new(0xFF));
        Self { len, cells }
    }

    #[inline]
    fn get(&self, ix: usize) -> u8 {
        (self.cells[ix >> 1].load(Ordering::Relaxed) >> ((ix & 1) * 4)) & 0x0F
    }

    /// Write `val` if the entry is still unfilled. Returns whether this call
    /// made the write; losing a race to another thread returns false.
    #[inline]
    fn try_set(&self, ix: usize, val: u8) -> bool {
        let cell = &self.cells[ix >> 1];
        let shift = (ix & 1) * 4;
        let mut cur = cell.load(Ordering::Relaxed);
        loop {
            if (cur >> shift) & 0x0F != EMPTY {
                return false;
            }
            let new = (cur & !(0x0F << shift)) | (val << shift);
            match cell.compare_exchange_weak(cur, new, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => return true,
                Err(seen) => cur = seen,
            }
        }
    }

    fn finish(self) -> NibbleTable {
        let data = self.cells.into_iter().map(|c| c.into_inner()).collect();
        NibbleTable {
            len: self.len,
            data,
        }
    }
}

/// Breadth-first flood from the goal entry over a move graph.
///
/// `succ` pushes, for one index, the indices after each allowed move. At
/// every depth d all entries equal to d are scanned and their successors
/// still unfilled get d+1; the scan is split over disjoint index ranges per
/// thread. Ends when a pass writes nothing or when depth 14 is filled;
/// deeper entries keep the value 0xF.
pub fn flood<F>(name: &str, len: usize, goal: usize, threads: usize, succ: F) -> NibbleTable
where
    F: Fn(usize, &mut Vec<usize>) + Sync,
{
    println!("Creating {} table ({} entries)...", name, len);
    let builder = NibbleBuilder::new(len);
    builder.try_set(goal, 0);
    let threads = threads.max(1);
    let chunk = len / threads + 1;
    let mut filled: usize = 1;
    let mut depth: u8 = 0;
    while depth < EMPTY - 1 {
        let written = AtomicUsize::new(0);
        thread::scope(|s| {
            for t in 0..threads {
                let lo = (t * chunk).min(len);
                let hi = ((t + 1) * chunk).min(len);
                let builder = &builder;
                let written = &written;
                let succ = &succ;
                s.spawn(move || {
                    let mut next = Vec::with_capacity(N_MOVE);
                    let mut local = 0;
                    for ix in lo..hi {
                        if builder.get(ix) != depth {
                            continue;
                        }
                        next.clear();
                        succ(ix, &mut next);
                        for &nx in &next {
                            if builder.try_set(nx, depth + 1) {
                                local += 1;
                            }
                        }
                    }
                    written.fetch_add(local, Ordering::Relaxed);
                });
            }
        });
        let written = written.load(Ordering::Relaxed);
        if written == 0 {
            break;
        }
        filled += written;
        depth += 1;
        println!("depth {}: {}/{} entries", depth, filled, len);
    }
    builder.finish()
}

/// The Kociemba pruning set: distances to the phase targets.
///
/// Phase 1 prunes on max(twist, flip x slice), phase 2 on
/// max(corners x slice-perm, ud-edges x slice-perm).
pub struct KociembaTables {
    pub twist: NibbleTable,
    pub flipslice: NibbleTable,
    pub cornslice: NibbleTable,
    pub edgeslice: NibbleTable,
}

/// Record layout of the Kociemba table file.
pub const KOCIEMBA_LAYOUT: [TableSpec; 4] = [
    TableSpec {
        ident: TABLE_PHASE1_TWIST,
        len: N_TWIST,
    },
    TableSpec {
        ident: TABLE_PHASE1_FLIPSLICE,
        len: N_SLICE * N_FLIP,
    },
    TableSpec {
        ident: TABLE_PHASE2_CORNSLICE,
        len: N_CORNERS * N_PERM_4,
    },
    TableSpec {
        ident: TABLE_PHASE2_EDGESLICE,
        len: N_UD_EDGES * N_PERM_4,
    },
];

impl KociembaTables {
    /// Build all four tables in memory by BFS flooding.
    pub fn build(mv: &MoveTables, threads: usize) -> Self {
        let twist = flood("phase1_twist", N_TWIST, 0, threads, |ix, out| {
            for m in ALL_MOVES {
                out.push(mv.twist(ix as u16, m) as usize);
            }
        });
        let flipslice = flood("phase1_flipslice", N_SLICE * N_FLIP, 0, threads, |ix, out| {
            let slice = (ix / N_FLIP) as u16;
            let flip = (ix % N_FLIP) as u16;
            for m in ALL_MOVES {
                out.push(mv.slice(slice, m) as usize * N_FLIP + mv.flip(flip, m) as usize);
            }
        });
        let cornslice = flood(
            "phase2_cornslice",
            N_CORNERS * N_PERM_4,
            0,
            threads,
            |ix, out| {
                let corners = (ix / N_PERM_4) as u16;
                let sp = (ix % N_PERM_4) as u16;
                for m in PHASE2_MOVES {
                    out.push(mv.corners(corners, m) as usize * N_PERM_4 + mv.slice_perm(sp, m) as usize);
                }
            },
        );
        let edgeslice = flood(
            "phase2_edgeslice",
            N_UD_EDGES * N_PERM_4,
            0,
            threads,
            |ix, out| {
                let ud = (ix / N_PERM_4) as u16;
                let sp = (ix % N_PERM_4) as u16;
                for m in PHASE2_MOVES {
                    out.push(mv.ud_edges(ud, m) as usize * N_PERM_4 + mv.slice_perm(sp, m) as usize);
                }
            },
        );
        Self {
            twist,
            flipslice,
            cornslice,
            edgeslice,
        }
    }

    /// Lower bound on the moves to reach the subgroup.
    #[inline]
    pub fn phase1_depth(&self, twist: u16, flip: u16, slice: u16) -> u8 {
        let product = self.flipslice.get(slice as usize * N_FLIP + flip as usize);
        self.twist.get(twist as usize).max(product)
    }

    /// Lower bound on the phase-2 moves to reach the solved cube.
    #[inline]
    pub fn phase2_depth(&self, corners: u16, ud_edges: u16, slice_perm: u16) -> u8 {
        let c = self
            .cornslice
            .get(corners as usize * N_PERM_4 + slice_perm as usize);
        let e = self
            .edgeslice
            .get(ud_edges as usize * N_PERM_4 + slice_perm as usize);
        c.max(e)
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        persist::save_tables(
            path,
            &KOCIEMBA_MAGIC,
            &[
                (TABLE_PHASE1_TWIST, &self.twist),
                (TABLE_PHASE1_FLIPSLICE, &self.flipslice),
                (TABLE_PHASE2_CORNSLICE, &self.cornslice),
                (TABLE_PHASE2_EDGESLICE, &self.edgeslice),
            ],
        )
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let mut tables = persist::load_tables(path, &KOCIEMBA_MAGIC, &KOCIEMBA_LAYOUT)?;
        let edgeslice = tables.pop().unwrap();
        let cornslice = tables.pop().unwrap();
        let flipslice = tables.pop().unwrap();
        let twist = tables.pop().unwrap();
        Ok(Self {
            twist,
            flipslice,
            cornslice,
            edgeslice,
        })
    }
}

/// The KROF pattern databases: corners, and two groups of six edges, each
/// keyed by placement and orientation.
pub struct KrofTables {
    pub corners: NibbleTable,
    pub first_edges: NibbleTable,
    pub last_edges: NibbleTable,
}

/// Record layout of the KROF table file.
pub const KROF_LAYOUT: [TableSpec; 3] = [
    TableSpec {
        ident: TABLE_KROF_CORNERS,
        len: N_CORNER_STATES,
    },
    TableSpec {
        ident: TABLE_KROF_FIRST_EDGES,
        len: N_EDGE6_STATES,
    },
    TableSpec {
        ident: TABLE_KROF_LAST_EDGES,
        len: N_EDGE6_STATES,
    },
];

impl KrofTables {
    /// Build the three pattern databases in memory. This scans hundreds of
    /// millions of states and takes minutes even on many threads.
    pub fn build(threads: usize) -> Self {
        let corners = flood("krof_corners", N_CORNER_STATES, 0, threads, |ix, out| {
            let cc = corner_state(ix);
            for m in ALL_MOVES {
                let mut next = cc;
                next.corner_multiply(&move_cube(m));
                out.push(corner_index(&next));
            }
        });
        let solved = CubieCube::default();
        let first_edges = flood(
            "krof_first_edges",
            N_EDGE6_STATES,
            edge6_index(&solved, FIRST_EDGE_BASE),
            threads,
            |ix, out| {
                let cc = edge6_state(ix, FIRST_EDGE_BASE);
                for m in ALL_MOVES {
                    let mut next = cc;
                    next.edge_multiply(&move_cube(m));
                    out.push(edge6_index(&next, FIRST_EDGE_BASE));
                }
            },
        );
        let last_edges = flood(
            "krof_last_edges",
            N_EDGE6_STATES,
            edge6_index(&solved, LAST_EDGE_BASE),
            threads,
            |ix, out| {
                let cc = edge6_state(ix, LAST_EDGE_BASE);
                for m in ALL_MOVES {
                    let mut next = cc;
                    next.edge_multiply(&move_cube(m));
                    out.push(edge6_index(&next, LAST_EDGE_BASE));
                }
            },
        );
        Self {
            corners,
            first_edges,
            last_edges,
        }
    }

    /// Lower bound on the moves to solve the given state.
    #[inline]
    pub fn depth(&self, cc: &CubieCube) -> u8 {
        let c = self.corners.get(corner_index(cc));
        let a = self.first_edges.get(edge6_index(cc, FIRST_EDGE_BASE));
        let b = self.last_edges.get(edge6_index(cc, LAST_EDGE_BASE));
        c.max(a).max(b)
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        persist::save_tables(
            path,
            &KROF_MAGIC,
            &[
                (TABLE_KROF_CORNERS, &self.corners),
                (TABLE_KROF_FIRST_EDGES, &self.first_edges),
                (TABLE_KROF_LAST_EDGES, &self.last_edges),
            ],
        )
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let mut tables = persist::load_tables(path, &KROF_MAGIC, &KROF_LAYOUT)?;
        let last_edges = tables.pop().unwrap();
        let first_edges = tables.pop().unwrap();
        let corners = tables.pop().unwrap();
        Ok(Self {
            corners,
            first_edges,
            last_edges,
        })
    }
}
