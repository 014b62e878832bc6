pub mod roles;
pub mod strategy;
pub mod vault;
pub mod venue;

pub use roles::*;
pub use strategy::*;
pub use vault::*;
pub use venue::*;
