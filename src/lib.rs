//! td-2048: a 2048 engine + n-tuple TD(0) afterstate learner
//!
//! This crate provides:
//! - A cell-exponent `Board` type with the four directional moves dispatched
//!   through one canonical left-merge (`engine` module)
//! - An n-tuple network value function over 17 row/column/square patterns
//!   (`ntuple` module)
//! - A greedy afterstate agent with a TD(0) learning rule (`agent` module)
//! - An episode driver and reverse learning pass (`gameplay` module)
//! - Checkpoint persistence for trained agents (`model` module)
//!
//! Quick start:
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use td_2048::agent::Agent;
//! use td_2048::gameplay::{learn_from_gameplay, play};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut agent = Agent::default();
//! let gameplay = play(&agent, None, true, &mut rng).unwrap();
//! learn_from_gameplay(&mut agent, &gameplay, 0.1).unwrap();
//! assert!(!gameplay.transitions.is_empty());
//! ```
//!
//! Note: every randomized operation takes the RNG explicitly. Seed a
//! `StdRng` when you need determinism; hand in `rand::thread_rng()`
//! otherwise.

pub mod agent;
pub mod engine;
pub mod gameplay;
pub mod model;
pub mod ntuple;
