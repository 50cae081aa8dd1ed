use fast_image_resize::{
    FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer,
    images::{Image, ImageRef},
};
use ndarray::{Array, IxDyn};

const LETTERBOX_COLOR: u8 = 114;

/// Mapping from model-input coordinates back to original-image pixels.
#[derive(Debug, Clone, Copy)]
pub struct LetterboxTransform {
    pub orig_width: u32,
    pub orig_height: u32,
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// Resizes an RGB image into a fixed square model input, preserving aspect
/// ratio and padding the borders, then normalizes to `[0, 1]` NCHW.
pub struct Preprocessor {
    input_size: (u32, u32),
    letterboxed_buffer: Vec<u8>,
}

impl Preprocessor {
    pub fn new(input_size: (u32, u32)) -> Self {
        Self {
            input_size,
            letterboxed_buffer: vec![LETTERBOX_COLOR; (input_size.0 * input_size.1 * 3) as usize],
        }
    }

    pub fn run(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> anyhow::Result<(Array<f32, IxDyn>, LetterboxTransform)> {
        let expected_size = (width * height * 3) as usize;
        if pixels.len() != expected_size {
            anyhow::bail!(
                "Buffer size mismatch: expected {}, got {} bytes",
                expected_size,
                pixels.len()
            );
        }

        let transform = self.resize_and_letterbox(pixels, width, height)?;
        let input = self.normalize()?;

        Ok((input, transform))
    }

    fn resize_and_letterbox(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> anyhow::Result<LetterboxTransform> {
        let (input_w, input_h) = self.input_size;

        let scale = (input_w as f32 / width as f32).min(input_h as f32 / height as f32);
        let new_width = ((width as f32 * scale) as u32).max(1);
        let new_height = ((height as f32 * scale) as u32).max(1);

        let offset_x = (input_w - new_width) / 2;
        let offset_y = (input_h - new_height) / 2;

        let src = ImageRef::new(width, height, pixels, PixelType::U8x3)?;
        let mut resized = Image::new(new_width, new_height, PixelType::U8x3);

        let mut resizer = Resizer::new();
        resizer.resize(
            &src,
            &mut resized,
            &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear)),
        )?;

        self.letterboxed_buffer.fill(LETTERBOX_COLOR);
        let row_bytes = (new_width * 3) as usize;
        let dst_stride = (input_w * 3) as usize;
        let resized_pixels = resized.buffer();
        for row in 0..new_height as usize {
            let src_start = row * row_bytes;
            let dst_start =
                (row + offset_y as usize) * dst_stride + (offset_x as usize) * 3;
            self.letterboxed_buffer[dst_start..dst_start + row_bytes]
                .copy_from_slice(&resized_pixels[src_start..src_start + row_bytes]);
        }

        Ok(LetterboxTransform {
            orig_width: width,
            orig_height: height,
            scale,
            offset_x: offset_x as f32,
            offset_y: offset_y as f32,
        })
    }

    /// HWC u8 -> NCHW f32 in [0, 1].
    fn normalize(&self) -> anyhow::Result<Array<f32, IxDyn>> {
        let (input_w, input_h) = self.input_size;
        let (w, h) = (input_w as usize, input_h as usize);
        let plane = w * h;

        let mut data = vec![0.0f32; 3 * plane];
        for (i, px) in self.letterboxed_buffer.chunks_exact(3).enumerate() {
            data[i] = px[0] as f32 / 255.0;
            data[plane + i] = px[1] as f32 / 255.0;
            data[2 * plane + i] = px[2] as f32 / 255.0;
        }

        Ok(Array::from_shape_vec(IxDyn(&[1, 3, h, w]), data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_image_is_scaled_by_width_and_centered_vertically() {
        let mut pre = Preprocessor::new((640, 640));
        let pixels = vec![200u8; 320 * 160 * 3];
        let (input, transform) = pre.run(&pixels, 320, 160).unwrap();

        assert_eq!(input.shape(), &[1, 3, 640, 640]);
        assert!((transform.scale - 2.0).abs() < 1e-6);
        assert_eq!(transform.offset_x, 0.0);
        assert_eq!(transform.offset_y, 160.0);
    }

    #[test]
    fn padding_rows_keep_letterbox_color() {
        let mut pre = Preprocessor::new((64, 64));
        let pixels = vec![255u8; 64 * 32 * 3];
        let (input, transform) = pre.run(&pixels, 64, 32).unwrap();

        assert_eq!(transform.offset_y, 16.0);
        // First row lies in the padded border.
        assert!((input[[0, 0, 0, 0]] - LETTERBOX_COLOR as f32 / 255.0).abs() < 1e-6);
        // Center row holds image content.
        assert!((input[[0, 0, 32, 32]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_buffer_size_mismatch() {
        let mut pre = Preprocessor::new((640, 640));
        let pixels = vec![0u8; 10];
        assert!(pre.run(&pixels, 320, 160).is_err());
    }
}
