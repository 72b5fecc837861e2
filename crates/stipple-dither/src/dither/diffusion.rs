//! Error-diffusion quantizers, one per kernel.

use super::{
    dither_with_kernel, Dither, DitherOptions, Plane, ATKINSON, BURKES, FLOYD_STEINBERG,
    JARVIS_JUDICE_NINKE, SIERRA_LITE, STUCKI,
};
use crate::palette::Levels;

macro_rules! diffusion_algorithm {
    ($(#[$doc:meta])* $name:ident, $kernel:expr) => {
        $(#[$doc])*
        pub struct $name;

        impl Dither for $name {
            fn dither(&self, plane: &Plane, levels: &Levels, options: &DitherOptions) -> Vec<u8> {
                dither_with_kernel(plane, levels, &$kernel, options)
            }
        }
    };
}

diffusion_algorithm!(
    /// Floyd-Steinberg: 7/16 right, 3/16, 5/16 and 1/16 on the row below.
    FloydSteinberg,
    FLOYD_STEINBERG
);
diffusion_algorithm!(
    /// Atkinson: 1/8 to six neighbours, 75% of the error in total.
    Atkinson,
    ATKINSON
);
diffusion_algorithm!(JarvisJudiceNinke, JARVIS_JUDICE_NINKE);
diffusion_algorithm!(Stucki, STUCKI);
diffusion_algorithm!(Burkes, BURKES);
diffusion_algorithm!(SierraLite, SIERRA_LITE);
