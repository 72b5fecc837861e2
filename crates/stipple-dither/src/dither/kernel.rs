//! Fixed error-diffusion kernels.
//!
//! Offsets are relative to the pixel being quantized; `dy` never points
//! backwards, so every neighbour receiving error is still unvisited in a
//! row-major scan.

/// Weight table for one error-diffusion algorithm.
///
/// Each neighbour receives `error * weight / divisor`. `max_dy` is the
/// deepest row offset, so the sliding error buffer keeps `max_dy + 1` rows.
#[derive(Debug, Clone, Copy)]
pub struct Kernel {
    pub entries: &'static [(i32, i32, u8)],
    pub divisor: u8,
    pub max_dy: usize,
}

/// ```text
///        X   7
///    3   5   1      (/16)
/// ```
pub const FLOYD_STEINBERG: Kernel = Kernel {
    entries: &[(1, 0, 7), (-1, 1, 3), (0, 1, 5), (1, 1, 1)],
    divisor: 16,
    max_dy: 1,
};

/// Spreads 6/8 of the error; the rest is dropped, which keeps highlights
/// and shadows clean at the cost of some tonal accuracy.
///
/// ```text
///        X   1   1
///    1   1   1
///        1          (/8)
/// ```
pub const ATKINSON: Kernel = Kernel {
    entries: &[(1, 0, 1), (2, 0, 1), (-1, 1, 1), (0, 1, 1), (1, 1, 1), (0, 2, 1)],
    divisor: 8,
    max_dy: 2,
};

/// ```text
///            X   7   5
///    3   5   7   5   3
///    1   3   5   3   1      (/48)
/// ```
pub const JARVIS_JUDICE_NINKE: Kernel = Kernel {
    entries: &[
        (1, 0, 7),
        (2, 0, 5),
        (-2, 1, 3),
        (-1, 1, 5),
        (0, 1, 7),
        (1, 1, 5),
        (2, 1, 3),
        (-2, 2, 1),
        (-1, 2, 3),
        (0, 2, 5),
        (1, 2, 3),
        (2, 2, 1),
    ],
    divisor: 48,
    max_dy: 2,
};

/// ```text
///            X   8   4
///    2   4   8   4   2
///    1   2   4   2   1      (/42)
/// ```
pub const STUCKI: Kernel = Kernel {
    entries: &[
        (1, 0, 8),
        (2, 0, 4),
        (-2, 1, 2),
        (-1, 1, 4),
        (0, 1, 8),
        (1, 1, 4),
        (2, 1, 2),
        (-2, 2, 1),
        (-1, 2, 2),
        (0, 2, 4),
        (1, 2, 2),
        (2, 2, 1),
    ],
    divisor: 42,
    max_dy: 2,
};

/// Two-row cut of Stucki.
///
/// ```text
///            X   8   4
///    2   4   8   4   2      (/32)
/// ```
pub const BURKES: Kernel = Kernel {
    entries: &[
        (1, 0, 8),
        (2, 0, 4),
        (-2, 1, 2),
        (-1, 1, 4),
        (0, 1, 8),
        (1, 1, 4),
        (2, 1, 2),
    ],
    divisor: 32,
    max_dy: 1,
};

/// ```text
///    X   2
///    1   1      (/4)
/// ```
pub const SIERRA_LITE: Kernel = Kernel {
    entries: &[(1, 0, 2), (-1, 1, 1), (0, 1, 1)],
    divisor: 4,
    max_dy: 1,
};

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [(&str, Kernel, u8); 6] = [
        ("floyd-steinberg", FLOYD_STEINBERG, 16),
        ("atkinson", ATKINSON, 6),
        ("jjn", JARVIS_JUDICE_NINKE, 48),
        ("stucki", STUCKI, 42),
        ("burkes", BURKES, 32),
        ("sierra-lite", SIERRA_LITE, 4),
    ];

    #[test]
    fn test_weight_sums() {
        for (name, kernel, expected) in ALL {
            let sum: u8 = kernel.entries.iter().map(|(_, _, w)| w).sum();
            assert_eq!(sum, expected, "{name} weight sum");
        }
        // Atkinson is the only lossy kernel: 6/8
        assert_eq!(ATKINSON.divisor, 8);
    }

    #[test]
    fn test_max_dy_matches_entries() {
        for (name, kernel, _) in ALL {
            let deepest = kernel.entries.iter().map(|(_, dy, _)| *dy as usize).max();
            assert_eq!(deepest, Some(kernel.max_dy), "{name} max_dy");
        }
    }

    #[test]
    fn test_never_diffuses_backwards() {
        for (name, kernel, _) in ALL {
            for &(dx, dy, _) in kernel.entries {
                assert!(dy > 0 || dx > 0, "{name} writes to a visited pixel");
            }
        }
    }
}
