#![deny(missing_docs)]

//! Core value types shared by the AFC azimuthal-correlation crates:
//! structured errors, complex flow-vector algebra, and the per-event
//! particle record together with its upstream source representations.

pub mod complex;
pub mod errors;
pub mod track;

pub use complex::Complex;
pub use errors::{AfcError, ErrorInfo};
pub use track::{phi_0_2pi, RawTrack, Track};
