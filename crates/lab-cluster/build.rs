use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Number of entries per gamma table. Index `i` maps to the input `i / (LUT_SIZE - 1)`.
const LUT_SIZE: usize = 4096;

/// IEC 61966-2-1 decode: gamma-encoded sRGB to linear light
fn decode_gamma(v: f64) -> f64 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// IEC 61966-2-1 encode: linear light to gamma-encoded sRGB
fn encode_gamma(v: f64) -> f64 {
    if v <= 0.0031308 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

fn write_table(
    out: &mut impl Write,
    name: &str,
    doc: &str,
    curve: fn(f64) -> f64,
) -> io::Result<()> {
    writeln!(out, "/// {doc}")?;
    writeln!(out, "pub static {name}: [f32; {LUT_SIZE}] = [")?;
    for row in (0..LUT_SIZE).collect::<Vec<_>>().chunks(8) {
        write!(out, "   ")?;
        for &i in row {
            let x = i as f64 / (LUT_SIZE - 1) as f64;
            write!(out, " {:.9},", curve(x) as f32)?;
        }
        writeln!(out)?;
    }
    writeln!(out, "];")?;
    writeln!(out)
}

fn main() -> io::Result<()> {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let dest = Path::new(&out_dir).join("gamma_lut.rs");
    let mut out = BufWriter::new(File::create(dest)?);

    writeln!(out, "pub const LUT_LAST: usize = {};", LUT_SIZE - 1)?;
    writeln!(out)?;
    write_table(
        &mut out,
        "SRGB_TO_LINEAR",
        "sRGB (gamma-encoded) to linear light, sampled over 0.0..=1.0",
        decode_gamma,
    )?;
    write_table(
        &mut out,
        "LINEAR_TO_SRGB",
        "Linear light to sRGB (gamma-encoded), sampled over 0.0..=1.0",
        encode_gamma,
    )?;
    out.flush()?;

    println!("cargo::rerun-if-changed=build.rs");
    Ok(())
}
