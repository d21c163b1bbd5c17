use anyhow::{ensure, Result};
use glam::Vec3;

/// Phong shading parameters applied during the main pass only; shadow passes
/// never touch materials.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub ambient: Vec3,
    pub shininess: f32,
    pub texture: Option<TextureImage>,
}

impl Material {
    /// The demo's stock Phong parameters.
    pub fn phong() -> Self {
        Self {
            diffuse: Vec3::splat(0.8),
            specular: Vec3::splat(1.0),
            ambient: Vec3::splat(0.1),
            shininess: 32.0,
            texture: None,
        }
    }

    /// Stock parameters tinted by a diffuse color.
    pub fn colored(diffuse: Vec3) -> Self {
        Self {
            diffuse,
            ..Self::phong()
        }
    }

    pub fn with_texture(mut self, texture: TextureImage) -> Self {
        self.texture = Some(texture);
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::phong()
    }
}

/// Raw RGBA8 image uploaded once at scene build.
///
/// Decoding image files is a collaborator concern; the demo gets by with the
/// procedural checkerboard.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        ensure!(width > 0 && height > 0, "texture must not be empty");
        ensure!(
            pixels.len() == (width * height * 4) as usize,
            "expected {} RGBA bytes, got {}",
            width * height * 4,
            pixels.len()
        );
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Square checkerboard of `squares` x `squares` cells.
    pub fn checkerboard(size: u32, squares: u32, light: [u8; 4], dark: [u8; 4]) -> Self {
        let cell = (size / squares).max(1);
        let mut pixels = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let parity = (x / cell + y / cell) % 2;
                let color = if parity == 0 { light } else { dark };
                pixels.extend_from_slice(&color);
            }
        }
        Self {
            width: size,
            height: size,
            pixels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_phong_matches_the_tuned_constants() {
        let material = Material::phong();
        assert_eq!(material.diffuse, Vec3::splat(0.8));
        assert_eq!(material.specular, Vec3::splat(1.0));
        assert_eq!(material.ambient, Vec3::splat(0.1));
        assert_eq!(material.shininess, 32.0);
        assert!(material.texture.is_none());
    }

    #[test]
    fn checkerboard_alternates_cells() {
        let image = TextureImage::checkerboard(4, 2, [255; 4], [0, 0, 0, 255]);
        assert_eq!(image.pixels.len(), 4 * 4 * 4);
        let pixel = |x: usize, y: usize| image.pixels[(y * 4 + x) * 4];
        assert_eq!(pixel(0, 0), 255);
        assert_eq!(pixel(2, 0), 0);
        assert_eq!(pixel(0, 2), 0);
        assert_eq!(pixel(2, 2), 255);
    }

    #[test]
    fn from_pixels_rejects_mismatched_sizes() {
        assert!(TextureImage::from_pixels(2, 2, vec![0; 16]).is_ok());
        assert!(TextureImage::from_pixels(2, 2, vec![0; 15]).is_err());
        assert!(TextureImage::from_pixels(0, 2, Vec::new()).is_err());
    }
}
