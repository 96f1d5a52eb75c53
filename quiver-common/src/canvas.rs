#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CanvasDimensions {
    pub size: [f32; 2],
    pub scale: f32,
}

impl CanvasDimensions {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: [width, height],
            scale: 1.0,
        }
    }

    pub fn to_physical_width(&self) -> u32 {
        (self.size[0] * self.scale) as u32
    }

    pub fn to_physical_height(&self) -> u32 {
        (self.size[1] * self.scale) as u32
    }
}

/// Rasterized figure as straight-alpha RGBA8 pixels, row-major
#[derive(Debug, Clone)]
pub struct Canvas {
    pub dimensions: CanvasDimensions,
    pub pixels: Vec<u8>,
}

impl Canvas {
    pub fn width(&self) -> u32 {
        self.dimensions.to_physical_width()
    }

    pub fn height(&self) -> u32 {
        self.dimensions.to_physical_height()
    }

    /// Rgba of the pixel at physical coordinates, if inside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let offset = ((y * self.width() + x) * 4) as usize;
        let px = self.pixels.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}
