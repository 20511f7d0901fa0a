use crate::Color;

/// Describes how to blend a source pixel onto a destination pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// The destination pixel is overwritten with the source pixel.
    Overwrite,

    /// Performs alpha blending between source and destination pixels to make the source image
    /// appear in front of the destination image.
    #[default]
    Alpha,
}

impl BlendMode {
    /// Combines `src` with `dest` according to this blend mode.
    pub fn apply(self, dest: Color, src: Color) -> Color {
        match self {
            BlendMode::Overwrite => src,
            BlendMode::Alpha => blend_alpha(dest, src),
        }
    }
}

fn blend_alpha(dest: Color, src: Color) -> Color {
    fn blend_color(dest: f32, src: f32, dest_alpha: f32, src_alpha: f32, result_alpha: f32) -> f32 {
        (src * src_alpha + dest * dest_alpha * (1.0 - src_alpha)) / result_alpha
    }

    // Fast paths: these are by far the most common cases when drawing product cutouts.
    match src.a() {
        255 => return src,
        0 => return dest,
        _ => {}
    }

    let dest = LinearColor::new(dest);
    let src = LinearColor::new(src);

    let result_alpha = src.a() + dest.a() * (1.0 - src.a());
    let r = blend_color(dest.r(), src.r(), dest.a(), src.a(), result_alpha);
    let g = blend_color(dest.g(), src.g(), dest.a(), src.a(), result_alpha);
    let b = blend_color(dest.b(), src.b(), dest.a(), src.a(), result_alpha);

    LinearColor([r, g, b, result_alpha]).to_color()
}

struct LinearColor([f32; 4]);

impl LinearColor {
    fn new(color: Color) -> Self {
        fn to_rgb(srgb: f32) -> f32 {
            if srgb <= 0.04045 {
                srgb / 12.92
            } else {
                ((srgb + 0.055) / 1.055).powf(2.4)
            }
        }

        let [r, g, b, a] = color.0.map(|c| f32::from(c) / 255.0);
        Self([to_rgb(r), to_rgb(g), to_rgb(b), a])
    }

    fn to_color(&self) -> Color {
        fn to_srgb(rgb: f32) -> f32 {
            if rgb <= 0.0031308 {
                rgb * 12.92
            } else {
                1.055 * rgb.powf(1.0 / 2.4) - 0.055
            }
        }

        let (r, g, b) = (to_srgb(self.r()), to_srgb(self.g()), to_srgb(self.b()));
        let [r, g, b, a] = [r, g, b, self.a()].map(|c| (c * 255.0).round().clamp(0.0, 255.0) as u8);

        Color([r, g, b, a])
    }

    fn r(&self) -> f32 {
        self.0[0]
    }

    fn g(&self) -> f32 {
        self.0[1]
    }

    fn b(&self) -> f32 {
        self.0[2]
    }

    fn a(&self) -> f32 {
        self.0[3]
    }
}
