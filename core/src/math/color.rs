/// Tableau 10 palette, one entry per frequency trace.
pub const TABLEAU: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

pub const REAL_COLOR: &str = "#AE4141";
pub const IMAG_COLOR: &str = "#FFB329";
pub const GRID_COLOR: &str = "#B0B0B0";
pub const GROUND_COLOR: &str = "#6cbe6c";

pub fn palette(index: usize) -> &'static str {
    TABLEAU[index % TABLEAU.len()]
}

/// Parses `#RRGGBB`.
pub fn parse_hex(color: &str) -> Option<[u8; 3]> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

pub fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb[0], rgb[1], rgb[2])
}

/// Mixes `color` over the background `bg` with opacity `alpha` (0..=255).
/// Unparseable colors are returned unchanged.
pub fn blend(color: &str, alpha: u8, bg: &str) -> String {
    let (Some(fg), Some(back)) = (parse_hex(color), parse_hex(bg)) else {
        return color.to_string();
    };
    let a = f64::from(alpha) / 255.0;
    let mut rgb = [0u8; 3];
    for i in 0..3 {
        let mixed = (1.0 - a) * f64::from(back[i]) / 255.0 + a * f64::from(fg[i]) / 255.0;
        rgb[i] = (mixed * 255.0).round() as u8;
    }
    to_hex(rgb)
}

/// Half-transparent version of `color` on white, used for grid lines.
pub fn light(color: &str) -> String {
    blend(color, 0x80, "#FFFFFF")
}

/// Rainbow colormap for `x` in `[0, 1]` (violet to red).
pub fn rainbow(x: f64) -> [u8; 3] {
    let x = if x.is_finite() { x.clamp(0.0, 1.0) } else { 0.0 };
    let r = (2.0 * x - 1.0).abs();
    let g = (std::f64::consts::PI * x).sin();
    let b = (std::f64::consts::FRAC_PI_2 * x).cos();
    [r, g, b].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}

pub fn rainbow_hex(x: f64) -> String {
    to_hex(rainbow(x))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_with_half_alpha() {
        assert_eq!(blend("#000000", 0x80, "#FFFFFF"), "#7F7F7F");
        assert_eq!(blend("#AE4141", 0xFF, "#FFFFFF"), "#AE4141");
        assert_eq!(blend("red", 0x80, "#FFFFFF"), "red");
    }

    #[test]
    fn rainbow_endpoints() {
        assert_eq!(rainbow(0.0), [255, 0, 255]);
        assert_eq!(rainbow(1.0), [255, 0, 0]);
        assert_eq!(rainbow(0.5)[1], 255);
    }

    #[test]
    fn palette_wraps() {
        assert_eq!(palette(10), TABLEAU[0]);
        assert_eq!(parse_hex("#1f77b4"), Some([0x1f, 0x77, 0xb4]));
        assert_eq!(parse_hex("#12"), None);
    }
}
