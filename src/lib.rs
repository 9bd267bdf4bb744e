//! Terminal survival shooter: a player fights escalating waves of enemies,
//! collecting experience and power-ups along the way.
//!
//! The simulation (`compute`, `spawner`) is pure and RNG-injected; the
//! binary owns terminal I/O and rendering.

pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod hitbox;
pub mod spawner;
