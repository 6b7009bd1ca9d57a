//! Color types and conversions
//!
//! Three spaces, each its own type so conversions are explicit:
//!
//! - **Srgb**: gamma-encoded, as decoded from image files and written to PNG.
//! - **LinearRgb**: linear light, the input to the XYZ matrices.
//! - **Lab**: CIE L*a*b* (D65), the space all clustering happens in.
//!
//! # Example
//!
//! ```
//! use lab_cluster::{Lab, LinearRgb, Srgb};
//!
//! let srgb = Srgb::from_u8(200, 30, 40);
//! let lab = Lab::from(LinearRgb::from(srgb));
//! assert!(lab.a > 0.0); // reddish
//!
//! let back = Srgb::from(LinearRgb::from(lab));
//! assert!((back.r - srgb.r).abs() < 0.005);
//! ```

mod lab;
mod linear_rgb;
mod lut;
mod srgb;

pub use lab::Lab;
pub use linear_rgb::LinearRgb;
pub use srgb::Srgb;
