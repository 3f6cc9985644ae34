//! # rubiks-solver
//! `rubiks-solver`: crate for solving the 3x3 Rubik's cube with
//! [Kociemba's two phase algorithm](http://kociemba.org/cube.htm) and
//! Korf's IDA* search over pattern databases (KROF).
//!
//! A solver is created with [`solver::new_kociemba`] or
//! [`solver::new_krof`], builds or loads its pruning tables with
//! [`solver::Solver::init`] / [`solver::Solver::init_from`], and then
//! answers [`solver::Solver::solve`] requests. Both solvers split the
//! search roots over worker threads and share a best-length gate.

#[macro_use]
extern crate lazy_static;

/// Error define.
pub mod error;

/// Module containing 3x3 cube constants.
pub mod constants;

/// Module for representing a cube on the facelet level.
pub mod facelet;

/// Module for representing a cube on the cubie level.
pub mod cubie;

/// Module for representing moves and creating the move tables.
pub mod moves;

/// Module for representing a cube on the coordinate level.
pub mod coord;

/// Module for creating the pruning tables. The pruning tables cut the
/// search tree during the search.
pub mod pruning;

/// Module for the on-disk pruning table format.
pub mod persist;

/// Module for the Kociemba and KROF solvers.
pub mod solver;

/// Module containing functions for scrambling the cube.
pub mod scramble;

pub use cubie::CubieCube;
pub use error::Error;
pub use facelet::{Color, FaceCube};
pub use moves::Move;
pub use solver::{new_kociemba, new_krof, Solver};
