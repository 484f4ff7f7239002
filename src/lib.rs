//! Parametric bubble key keyboard cases.
//!
//! Every key gets a cell: a sphere cut into a front and a back half, with a
//! plate, a switch hole, room for the keycap and optional insert and screw
//! hardware. Cells are described as ranked layers of holes and solids, put in
//! place, and folded into the two printable shells of the keyboard.

pub mod cache;
pub mod cell;
pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod hardware;
pub mod keyboard;
pub mod params;
pub mod primitives;
pub mod ranked;
pub mod shape;
pub mod switch;

pub use error::{Error, Result};
