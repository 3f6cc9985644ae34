use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;

use crate::constants::*;
use crate::coord::{CoordCube, Phase2Coord};
use crate::cubie::CubieCube;
use crate::error::Error;
use crate::moves::{move_cube, simplify, Move, MoveTables};
use crate::pruning::{KociembaTables, KrofTables};

/// Phase-1 iterative deepening cap.
const PHASE1_CAP: u8 = 20;
/// Longest phase-2 maneuver worth searching; the subgroup diameter is 18.
const PHASE2_CAP: u8 = 18;
/// KROF iterative deepening cap; every valid cube solves within 20 moves.
const KROF_CAP: u8 = 24;
/// A total at or below this length ends the Kociemba improvement loop.
const KOCIEMBA_TARGET: usize = 24;

/// The capability set shared by the two solvers.
pub trait Solver {
    /// Build all required pruning tables in memory.
    fn init(&mut self) -> Result<(), Error>;

    /// Load the pruning tables from the given file.
    fn init_from(&mut self, path: &Path) -> Result<(), Error>;

    /// Serialize the pruning tables to the given file.
    fn save(&self, path: &Path) -> Result<(), Error>;

    /// Solve the cube. The result applied to the input yields the solved
    /// cube, and no two consecutive moves share a face.
    fn solve(&self, cube: CubieCube) -> Result<Vec<Move>, Error>;
}

/// Create a Kociemba two-phase solver with the given worker thread count.
pub fn new_kociemba(threads: usize) -> Result<KociembaSolver, Error> {
    check_threads(threads)?;
    Ok(KociembaSolver {
        threads,
        mv: MoveTables::shared(),
        tables: None,
    })
}

/// Create a KROF (Korf) optimal solver with the given worker thread count.
pub fn new_krof(threads: usize) -> Result<KrofSolver, Error> {
    check_threads(threads)?;
    Ok(KrofSolver {
        threads,
        tables: None,
    })
}

fn check_threads(threads: usize) -> Result<(), Error> {
    if (1..=MAX_THREADS).contains(&threads) {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "thread count {threads} outside 1..={MAX_THREADS}"
        )))
    }
}

fn not_initialized() -> Error {
    Error::InvalidConfig("pruning tables not initialized".into())
}

/// A finished maneuver published by a worker.
struct Candidate {
    len: usize,
    worker: usize,
    order: usize,
    moves: Vec<Move>,
}

/// State shared by the search workers: the monotone best-length gate and
/// the winning maneuver, ordered by (length, worker id, discovery order).
struct SearchGate {
    best_len: AtomicUsize,
    winner: Mutex<Option<Candidate>>,
}

impl SearchGate {
    fn new() -> Self {
        Self {
            best_len: AtomicUsize::new(usize::MAX),
            winner: Mutex::new(None),
        }
    }

    fn best(&self) -> usize {
        self.best_len.load(Ordering::SeqCst)
    }

    fn publish(&self, cand: Candidate) {
        self.best_len.fetch_min(cand.len, Ordering::SeqCst);
        let mut slot = self.winner.lock().unwrap();
        let replace = match slot.as_ref() {
            None => true,
            Some(cur) => (cand.len, cand.worker, cand.order) < (cur.len, cur.worker, cur.order),
        };
        if replace {
            *slot = Some(cand);
        }
    }

    fn into_winner(self) -> Option<Vec<Move>> {
        self.winner.into_inner().unwrap().map(|c| c.moves)
    }
}

/// Deal the 18 first moves to min(threads, 18) workers, lowest heuristic
/// first, so the most promising roots land one per worker.
fn split_roots<H: Fn(Move) -> u8>(threads: usize, h: H) -> Vec<Vec<Move>> {
    let mut scored: Vec<(u8, usize, Move)> = ALL_MOVES
        .iter()
        .enumerate()
        .map(|(i, &m)| (h(m), i, m))
        .collect();
    scored.sort_by_key(|&(h, i, _)| (h, i));
    let buckets_n = threads.min(N_MOVE);
    let mut buckets: Vec<Vec<Move>> = vec![Vec::new(); buckets_n];
    for (i, (_, _, m)) in scored.into_iter().enumerate() {
        buckets[i % buckets_n].push(m);
    }
    buckets
}

/// Kociemba two-phase solver.
///
/// Owns its pruning tables; the move tables are the process-wide immutable
/// set. One instance may serve any number of solves.
pub struct KociembaSolver {
    threads: usize,
    mv: &'static MoveTables,
    tables: Option<KociembaTables>,
}

impl Solver for KociembaSolver {
    fn init(&mut self) -> Result<(), Error> {
        self.tables = Some(KociembaTables::build(self.mv, self.threads));
        Ok(())
    }

    fn init_from(&mut self, path: &Path) -> Result<(), Error> {
        self.tables = Some(KociembaTables::load(path)?);
        Ok(())
    }

    fn save(&self, path: &Path) -> Result<(), Error> {
        self.tables.as_ref().ok_or_else(not_initialized)?.save(path)
    }

    fn solve(&self, cube: CubieCube) -> Result<Vec<Move>, Error> {
        cube.verify()?;
        let pr = self.tables.as_ref().ok_or_else(not_initialized)?;
        if cube.is_solved() {
            return Ok(Vec::new());
        }
        let start = CoordCube::from_cubie(&cube)?;
        let mv = self.mv;
        let gate = SearchGate::new();
        let buckets = split_roots(self.threads, |m| {
            pr.phase1_depth(
                mv.twist(start.twist, m),
                mv.flip(start.flip, m),
                mv.slice(start.slice, m),
            )
        });
        thread::scope(|sc| {
            for (id, roots) in buckets.into_iter().enumerate() {
                let gate = &gate;
                sc.spawn(move || {
                    KociembaWorker {
                        id,
                        roots,
                        cube,
                        start,
                        mv,
                        pr,
                        gate,
                        bound: 0,
                        sofar1: Vec::new(),
                        sofar2: Vec::new(),
                        order: 0,
                    }
                    .run();
                });
            }
        });
        gate.into_winner().ok_or(Error::Unsolvable)
    }
}

/// One Kociemba worker: iterative deepening over the phase-1 depth with its
/// share of the root moves committed as first move.
struct KociembaWorker<'a> {
    id: usize,
    roots: Vec<Move>,
    cube: CubieCube,
    start: CoordCube,
    mv: &'a MoveTables,
    pr: &'a KociembaTables,
    gate: &'a SearchGate,
    /// Current phase-1 iterative deepening bound.
    bound: u8,
    sofar1: Vec<Move>,
    sofar2: Vec<Move>,
    order: usize,
}

impl KociembaWorker<'_> {
    /// Whether the current bound can no longer beat the shared best.
    fn aborted(&self) -> bool {
        self.bound as usize >= self.gate.best()
    }

    fn run(&mut self) {
        for togo1 in 1..=PHASE1_CAP {
            self.bound = togo1;
            // a finished deepening pass that reached the target length ends
            // the improvement loop; mid-pass aborts only on the bound
            let best = self.gate.best();
            if togo1 as usize >= best || best <= KOCIEMBA_TARGET {
                return;
            }
            for i in 0..self.roots.len() {
                let m = self.roots[i];
                let twist = self.mv.twist(self.start.twist, m);
                let flip = self.mv.flip(self.start.flip, m);
                let slice = self.mv.slice(self.start.slice, m);
                let dist = self.pr.phase1_depth(twist, flip, slice);
                if dist >= togo1 {
                    continue;
                }
                self.sofar1.clear();
                self.sofar1.push(m);
                self.dfs1(twist, flip, slice, dist, togo1 - 1);
            }
        }
    }

    fn dfs1(&mut self, twist: u16, flip: u16, slice: u16, dist: u8, togo: u8) {
        if self.aborted() {
            return;
        }
        if togo == 0 {
            // the heuristic is exact at 0: the subgroup is reached
            if dist == 0 {
                self.phase1_done();
            }
            return;
        }
        let prev = *self.sofar1.last().unwrap();
        for m in ALL_MOVES {
            // inside the subgroup a subgroup move belongs to phase 2; short
            // excursions out and back take at least 5 moves
            if dist == 0 && togo < 5 && PHASE2_MOVES.contains(&m) {
                continue;
            }
            if !m.allowed_after(prev) {
                continue;
            }
            let twist1 = self.mv.twist(twist, m);
            let flip1 = self.mv.flip(flip, m);
            let slice1 = self.mv.slice(slice, m);
            let dist1 = self.pr.phase1_depth(twist1, flip1, slice1);
            if dist1 >= togo {
                // the subgroup is out of reach in togo - 1 moves
                continue;
            }
            self.sofar1.push(m);
            self.dfs1(twist1, flip1, slice1, dist1, togo - 1);
            self.sofar1.pop();
        }
    }

    /// Phase 1 reached the subgroup; run phase 2 under the improvement budget.
    fn phase1_done(&mut self) {
        let d1 = self.sofar1.len();
        let best = self.gate.best();
        if d1 >= best {
            return;
        }
        let mut cb = self.cube;
        for &m in &self.sofar1 {
            cb.multiply(&move_cube(m));
        }
        let p2 = Phase2Coord::from_cubie(&cb);

        // a new total must be shorter than the best found so far
        let budget = (best - d1 - 1).min(PHASE2_CAP as usize) as u8;
        let dist2 = self.pr.phase2_depth(p2.corners, p2.ud_edges, p2.slice_perm);
        if dist2 > budget {
            return;
        }
        for togo2 in dist2..=budget {
            self.sofar2.clear();
            if self.dfs2(p2.corners, p2.ud_edges, p2.slice_perm, togo2) {
                self.publish();
                return;
            }
        }
    }

    fn dfs2(&mut self, corners: u16, ud_edges: u16, slice_perm: u16, togo: u8) -> bool {
        if togo == 0 {
            return corners == SOLVED && ud_edges == SOLVED && slice_perm == SOLVED;
        }
        for m in PHASE2_MOVES {
            if let Some(&prev) = self.sofar2.last().or(self.sofar1.last()) {
                if !m.allowed_after(prev) {
                    continue;
                }
            }
            let corners1 = self.mv.corners(corners, m);
            let ud_edges1 = self.mv.ud_edges(ud_edges, m);
            let slice_perm1 = self.mv.slice_perm(slice_perm, m);
            if self.pr.phase2_depth(corners1, ud_edges1, slice_perm1) >= togo {
                continue;
            }
            self.sofar2.push(m);
            if self.dfs2(corners1, ud_edges1, slice_perm1, togo - 1) {
                return true; // keep sofar2: it holds the found maneuver
            }
            self.sofar2.pop();
        }
        false
    }

    fn publish(&mut self) {
        let mut maneuver = self.sofar1.clone();
        maneuver.extend_from_slice(&self.sofar2);
        // collapse same-face runs at the phase seam
        let moves = simplify(&maneuver);
        self.gate.publish(Candidate {
            len: moves.len(),
            worker: self.id,
            order: self.order,
            moves,
        });
        self.order += 1;
    }
}

/// KROF (Korf) solver: single-phase IDA* over the full move set, guided by
/// the corner database and the two six-edge databases.
pub struct KrofSolver {
    threads: usize,
    tables: Option<KrofTables>,
}

impl Solver for KrofSolver {
    fn init(&mut self) -> Result<(), Error> {
        self.tables = Some(KrofTables::build(self.threads));
        Ok(())
    }

    fn init_from(&mut self, path: &Path) -> Result<(), Error> {
        self.tables = Some(KrofTables::load(path)?);
        Ok(())
    }

    fn save(&self, path: &Path) -> Result<(), Error> {
        self.tables.as_ref().ok_or_else(not_initialized)?.save(path)
    }

    fn solve(&self, cube: CubieCube) -> Result<Vec<Move>, Error> {
        cube.verify()?;
        let pr = self.tables.as_ref().ok_or_else(not_initialized)?;
        if cube.is_solved() {
            return Ok(Vec::new());
        }
        let gate = SearchGate::new();
        let buckets = split_roots(self.threads, |m| pr.depth(&cube.apply_move(m)));
        thread::scope(|sc| {
            for (id, roots) in buckets.into_iter().enumerate() {
                let gate = &gate;
                sc.spawn(move || {
                    KrofWorker {
                        id,
                        roots,
                        cube,
                        pr,
                        gate,
                        bound: 0,
                        path: Vec::new(),
                        order: 0,
                    }
                    .run();
                });
            }
        });
        gate.into_winner().ok_or(Error::Unsolvable)
    }
}

struct KrofWorker<'a> {
    id: usize,
    roots: Vec<Move>,
    cube: CubieCube,
    pr: &'a KrofTables,
    gate: &'a SearchGate,
    bound: u8,
    path: Vec<Move>,
    order: usize,
}

impl KrofWorker<'_> {
    fn aborted(&self) -> bool {
        self.bound as usize >= self.gate.best()
    }

    fn run(&mut self) {
        let h0 = self.pr.depth(&self.cube).max(1);
        for bound in h0..=KROF_CAP {
            self.bound = bound;
            if self.aborted() {
                return;
            }
            for i in 0..self.roots.len() {
                let m = self.roots[i];
                let next = self.cube.apply_move(m);
                self.path.clear();
                self.path.push(m);
                if self.dfs(&next, bound - 1) {
                    let moves = simplify(&self.path);
                    self.gate.publish(Candidate {
                        len: moves.len(),
                        worker: self.id,
                        order: self.order,
                        moves,
                    });
                    self.order += 1;
                    // the first hit of an IDA* deepening is this worker's best
                    return;
                }
            }
        }
    }

    fn dfs(&mut self, cube: &CubieCube, togo: u8) -> bool {
        if togo == 0 {
            return cube.is_solved();
        }
        if self.aborted() {
            return false;
        }
        if self.pr.depth(cube) > togo {
            return false;
        }
        let prev = *self.path.last().unwrap();
        for m in ALL_MOVES {
            if !m.allowed_after(prev) {
                continue;
            }
            let next = cube.apply_move(m);
            self.path.push(m);
            if self.dfs(&next, togo - 1) {
                return true;
            }
            self.path.pop();
        }
        false
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::moves::Move::*;
    use std::env;

    lazy_static! {
        static ref SOLVER_T1: KociembaSolver = {
            let mut s = new_kociemba(1).unwrap();
            s.init().unwrap();
            s
        };
        static ref SOLVER_T4: KociembaSolver = {
            let mut s = new_kociemba(4).unwrap();
            s.init().unwrap();
            s
        };
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(format!("rubiks-solver-{name}-{}", std::process::id()))
    }

    fn assert_solves(cube: &CubieCube, solution: &[Move]) {
        assert!(cube.apply_moves(solution).is_solved());
        for w in solution.windows(2) {
            assert_ne!(w[0].face(), w[1].face());
        }
    }

    #[test]
    fn test_factory_validates_threads() {
        assert!(matches!(new_kociemba(0), Err(Error::InvalidConfig(_))));
        assert!(matches!(new_kociemba(33), Err(Error::InvalidConfig(_))));
        assert!(matches!(new_krof(0), Err(Error::InvalidConfig(_))));
        assert!(new_kociemba(1).is_ok());
        assert!(new_krof(32).is_ok());
    }

    #[test]
    fn test_solve_requires_init() {
        let s = new_kociemba(2).unwrap();
        let cube = CubieCube::from(&vec![R, U]);
        assert!(matches!(s.solve(cube), Err(Error::InvalidConfig(_))));
        let s = new_krof(2).unwrap();
        assert!(matches!(s.solve(cube), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_cube_rejected() {
        // one corner twisted in isolation
        let mut twisted = CubieCube::default();
        twisted.co[0] = 1;
        assert!(matches!(
            new_kociemba(1).unwrap().solve(twisted),
            Err(Error::MalformedCube)
        ));

        // two corners swapped
        let mut swapped = CubieCube::default();
        swapped.cp.swap(0, 1);
        assert!(matches!(
            new_kociemba(1).unwrap().solve(swapped),
            Err(Error::MalformedCube)
        ));
    }

    #[test]
    fn test_solved_cube_empty_solution() {
        assert_eq!(SOLVER_T1.solve(CubieCube::default()).unwrap(), vec![]);
    }

    #[test]
    fn test_single_move() {
        let cube = CubieCube::default().apply_move(R);
        assert_eq!(SOLVER_T1.solve(cube).unwrap(), vec![R3]);
    }

    #[test]
    fn test_two_moves() {
        let cube = CubieCube::default().apply_moves(&[R, U]);
        assert_eq!(SOLVER_T1.solve(cube).unwrap(), vec![U3, R3]);
    }

    #[test]
    fn test_deep_scramble() {
        let scramble = vec![
            U, F3, D3, F2, D, B2, D3, R2, U3, F2, R2, D2, R2, U3, L, B, L, R, F3, D,
        ];
        let cube = CubieCube::from(&scramble);
        let solution = SOLVER_T4.solve(cube).unwrap();
        assert!(solution.len() <= 24, "solution too long: {}", solution.len());
        assert_solves(&cube, &solution);
    }

    #[test]
    fn test_determinism_fixed_threads() {
        let cube = CubieCube::from(&vec![R, U, R3, U3, F, L3, D3, B2, R3, U3]);
        let first = SOLVER_T1.solve(cube).unwrap();
        let second = SOLVER_T1.solve(cube).unwrap();
        assert_eq!(first, second);
        assert_solves(&cube, &first);
    }

    #[test]
    fn test_thread_invariance() {
        let cube = CubieCube::from(&vec![L2, D, F3, B, U2, R, D2, F, L3, U]);
        let s1 = SOLVER_T1.solve(cube).unwrap();
        let s4 = SOLVER_T4.solve(cube).unwrap();
        assert_solves(&cube, &s1);
        assert_solves(&cube, &s4);
    }

    #[test]
    fn test_save_load_round_trip() {
        let path_a = temp_path("kociemba-a");
        let path_b = temp_path("kociemba-b");
        SOLVER_T1.save(&path_a).unwrap();

        let mut reloaded = new_kociemba(2).unwrap();
        reloaded.init_from(&path_a).unwrap();
        reloaded.save(&path_b).unwrap();
        assert_eq!(
            std::fs::read(&path_a).unwrap(),
            std::fs::read(&path_b).unwrap()
        );

        let cube = CubieCube::default().apply_move(R);
        assert_eq!(reloaded.solve(cube).unwrap(), vec![R3]);

        let _ = std::fs::remove_file(&path_a);
        let _ = std::fs::remove_file(&path_b);
    }

    #[test]
    fn test_save_requires_init() {
        let s = new_kociemba(1).unwrap();
        assert!(matches!(
            s.save(&temp_path("never-written")),
            Err(Error::InvalidConfig(_))
        ));
    }

    // The KROF database build scans 173M states; run with
    // `cargo test --release -- --ignored`.
    #[test]
    #[ignore]
    fn test_krof_end_to_end() {
        let mut solver = new_krof(8).unwrap();
        solver.init().unwrap();

        assert_eq!(solver.solve(CubieCube::default()).unwrap(), vec![]);

        let cube = CubieCube::default().apply_move(R);
        assert_eq!(solver.solve(cube).unwrap(), vec![R3]);

        let scramble = vec![
            U, F3, D3, F2, D, B2, D3, R2, U3, F2, R2, D2, R2, U3, L, B, L, R, F3, D,
        ];
        let cube = CubieCube::from(&scramble);
        let solution = solver.solve(cube).unwrap();
        assert!(solution.len() <= 20);
        assert_solves(&cube, &solution);

        // save, destroy, reload: the same scramble gets the same maneuver
        let path = temp_path("krof-tables");
        solver.save(&path).unwrap();
        drop(solver);
        let mut reloaded = new_krof(8).unwrap();
        reloaded.init_from(&path).unwrap();
        assert_eq!(reloaded.solve(cube).unwrap(), solution);
        let _ = std::fs::remove_file(&path);
    }
}
