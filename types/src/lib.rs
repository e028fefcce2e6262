extern crate nalgebra as na;

pub mod geo;
pub mod observer;
pub mod pass;
pub mod prelude;
pub mod time;
pub mod tle;
pub mod track;
