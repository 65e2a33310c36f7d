//! Domain models for the clinic booking core.

mod appointment;
mod catalog;
mod policy;
mod sale;
pub mod slot;
mod vaccination;

pub use appointment::*;
pub use catalog::*;
pub use policy::*;
pub use sale::*;
pub use vaccination::*;
