//! Inverse kinematics: CCD and FABRIK solvers over rig node chains.

pub mod solver;

pub use solver::IkSolver;
