//! Hexfront - server-authoritative hex strategy turn engine

pub mod ai;
pub mod city;
pub mod combat;
pub mod core;
pub mod game;
pub mod map;
pub mod session;
