mod palette_png;

pub use palette_png::encode_png;
