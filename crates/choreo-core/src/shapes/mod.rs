//! Geometry generators.
//!
//! Every generator is a pure function of its parameters and an injected
//! `rand::Rng`, returning a fresh position array.
pub mod font;
pub mod scatter;
pub mod spiral;
pub mod text;
pub mod tree;
