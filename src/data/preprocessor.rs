// ============================================================
// Layer 4 — Pixel Preprocessor
// ============================================================
// Turns raw 8-bit greyscale pixels into model-ready floats.
//
//   byte 0   → 0.0
//   byte 255 → 1.0
//
// Every Item in the system goes through this exactly once,
// at load time, so the rest of the pipeline can assume the
// [0, 1] range.
//
// Reference: Rust Book §13 (Iterators)

const MAX_PIXEL: f32 = 255.0;

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Scale one flattened image into [0, 1].
    pub fn normalize(&self, pixels: &[u8]) -> Vec<f32> {
        pixels.iter().map(|&p| p as f32 / MAX_PIXEL).collect()
    }

    /// Split a contiguous pixel buffer into `image_size` chunks and scale each.
    /// A trailing partial chunk is dropped.
    pub fn normalize_all(&self, buffer: &[u8], image_size: usize) -> Vec<Vec<f32>> {
        if image_size == 0 {
            return Vec::new();
        }
        buffer
            .chunks_exact(image_size)
            .map(|img| self.normalize(img))
            .collect()
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_endpoints() {
        let p = Preprocessor::new();
        assert_eq!(p.normalize(&[0, 255]), vec![0.0, 1.0]);
    }

    #[test]
    fn test_values_stay_in_unit_interval() {
        let p   = Preprocessor::new();
        let all: Vec<u8> = (0..=255).collect();
        assert!(p.normalize(&all).iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_normalize_all_chunks() {
        let p      = Preprocessor::new();
        let images = p.normalize_all(&[0, 0, 255, 255, 7], 2);
        assert_eq!(images.len(), 2);
        assert_eq!(images[1], vec![1.0, 1.0]);
    }

    #[test]
    fn test_zero_image_size() {
        assert!(Preprocessor::new().normalize_all(&[1, 2, 3], 0).is_empty());
    }
}
