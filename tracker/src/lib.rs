pub extern crate nalgebra as na;

pub mod cache;
pub mod config;
pub mod events;
pub mod frames;
pub mod geolocator;
pub mod ground_track;
pub mod propagator;
pub mod report;
pub mod service;
pub mod source;
pub mod topocentric;
pub mod units;
