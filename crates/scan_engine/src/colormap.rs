//! "Winter" color map (blue to spring green).

/// Map an 8-bit intensity to RGB.
///
/// 0 maps to pure blue `(0, 0, 255)`, 255 to `(0, 255, 128)`.
pub fn winter(value: u8) -> [u8; 3] {
    let t = f64::from(value) / 255.0;
    let g = (255.0 * t).round() as u8;
    let b = (255.0 * (1.0 - 0.5 * t)).round() as u8;
    [0, g, b]
}

/// Precomputed 256-entry lookup table.
#[derive(Debug, Clone)]
pub struct ColorLut {
    table: [[u8; 3]; 256],
}

impl ColorLut {
    pub fn new(map: fn(u8) -> [u8; 3]) -> Self {
        let mut table = [[0u8; 3]; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            *entry = map(i as u8);
        }
        Self { table }
    }

    pub fn winter() -> Self {
        Self::new(winter)
    }

    #[inline]
    pub fn get(&self, value: u8) -> [u8; 3] {
        self.table[value as usize]
    }
}

impl Default for ColorLut {
    fn default() -> Self {
        Self::winter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winter_endpoints() {
        assert_eq!(winter(0), [0, 0, 255]);
        assert_eq!(winter(255), [0, 255, 128]);
    }

    #[test]
    fn test_winter_monotonic() {
        for v in 1..=255u8 {
            let prev = winter(v - 1);
            let cur = winter(v);
            assert_eq!(cur[0], 0);
            assert!(cur[1] >= prev[1]);
            assert!(cur[2] <= prev[2]);
        }
    }

    #[test]
    fn test_lut_matches_function() {
        let lut = ColorLut::winter();
        for v in 0..=255u8 {
            assert_eq!(lut.get(v), winter(v));
        }
    }

    #[test]
    fn test_no_entry_is_black() {
        let lut = ColorLut::winter();
        assert!((0..=255u8).all(|v| lut.get(v) != [0, 0, 0]));
    }
}
