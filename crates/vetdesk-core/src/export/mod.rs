//! Export of completed appointments to the point of sale.

mod pos;

pub use pos::*;
