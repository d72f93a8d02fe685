//! Rendering module
//!
//! Turns the world into interpolated quads plus a HUD. Actual display
//! output sits behind the `Surface` trait.

pub mod frame;
pub mod shapes;
pub mod surface;
pub mod vertex;

pub use frame::{Frame, Hud, present};
pub use surface::{HeadlessSurface, Surface};
pub use vertex::Vertex;
