//! Core game rules. Keep this crate free of IO and platform concerns.
//!
//! The dice and gem engines live under their own namespaces since both export
//! table-size constants; everything they share is re-exported flat.

pub mod catalog;
pub mod dice;
pub mod economy;
pub mod farkle;
pub mod gems;
pub mod outcome;
pub mod rng;
pub mod scoring;
pub mod stats;
pub mod tableau;

pub use dice::*;
pub use economy::*;
pub use outcome::*;
pub use rng::*;
pub use scoring::*;
pub use stats::*;
pub use tableau::*;
