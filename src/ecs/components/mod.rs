pub mod physics;

pub use self::physics::*;
