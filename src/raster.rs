//! Raster buffers.
//!
//! [`RasterBuffer`] is the packed, channel-interleaved 8-bit buffer every
//! other component operates on. Rows are padded to a 4-byte boundary, the
//! alignment convention of rendered page rasters. [`BitRaster`] is the
//! companion 1-bit plane used for spot-color plates and presence masks; its
//! bit order matches 1-bpc PDF image data, so its rows can be written to an
//! image stream as-is.

/// A packed multi-channel raster with 8 bits per component.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    num_channels: u8,
    stride: usize,
    data: Vec<u8>,
}

impl RasterBuffer {
    /// Creates a zero-filled raster.
    ///
    /// Returns `None` if any dimension or the channel count is zero, or if
    /// the buffer size would overflow.
    pub fn new(width: u32, height: u32, num_channels: u8) -> Option<Self> {
        if height == 0 {
            return None;
        }

        let stride = aligned_stride(width, num_channels)?;
        let len = stride.checked_mul(height as usize)?;

        Some(Self {
            width,
            height,
            num_channels,
            stride,
            data: vec![0; len],
        })
    }

    /// Adopts a buffer handed over by a renderer.
    ///
    /// The vector must hold exactly `stride * height` bytes, where the
    /// stride is the word-aligned row length for the given geometry.
    pub fn from_vec(width: u32, height: u32, num_channels: u8, data: Vec<u8>) -> Option<Self> {
        if height == 0 {
            return None;
        }

        let stride = aligned_stride(width, num_channels)?;
        let len = stride.checked_mul(height as usize)?;

        if data.len() != len {
            return None;
        }

        Some(Self {
            width,
            height,
            num_channels,
            stride,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn num_channels(&self) -> u8 {
        self.num_channels
    }

    /// Row length in bytes, including alignment padding.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The sample of channel `channel` at pixel (`x`, `y`).
    ///
    /// Panics if the coordinates or the channel are out of bounds.
    pub fn sample(&self, x: u32, y: u32, channel: u8) -> u8 {
        self.data[self.index(x, y, channel)]
    }

    pub fn set_sample(&mut self, x: u32, y: u32, channel: u8, value: u8) {
        let idx = self.index(x, y, channel);
        self.data[idx] = value;
    }

    /// All channels of the pixel at (`x`, `y`).
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let start = self.index(x, y, 0);
        &self.data[start..start + self.num_channels as usize]
    }

    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut [u8] {
        let start = self.index(x, y, 0);
        let end = start + self.num_channels as usize;
        &mut self.data[start..end]
    }

    /// One row, including alignment padding.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.stride]
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether every payload byte is zero. Padding bytes are ignored.
    pub fn is_blank(&self) -> bool {
        let payload = self.payload_row_len();
        (0..self.height).all(|y| self.row(y)[..payload].iter().all(|b| *b == 0))
    }

    /// The number of pixels with at least one nonzero channel.
    pub fn nonzero_pixels(&self) -> u64 {
        let channels = self.num_channels as usize;
        let payload = self.payload_row_len();
        let mut count = 0;

        for y in 0..self.height {
            for group in self.row(y)[..payload].chunks_exact(channels) {
                if group.iter().any(|b| *b != 0) {
                    count += 1;
                }
            }
        }

        count
    }

    /// The payload re-packed into tight rows of `width * num_channels`
    /// bytes, the layout PDF image streams require.
    pub fn packed_rows(&self) -> Vec<u8> {
        let payload = self.payload_row_len();
        let mut packed = Vec::with_capacity(payload * self.height as usize);

        for y in 0..self.height {
            packed.extend_from_slice(&self.row(y)[..payload]);
        }

        packed
    }

    fn payload_row_len(&self) -> usize {
        self.width as usize * self.num_channels as usize
    }

    fn index(&self, x: u32, y: u32, channel: u8) -> usize {
        assert!(x < self.width && y < self.height && channel < self.num_channels);

        y as usize * self.stride + x as usize * self.num_channels as usize + channel as usize
    }
}

/// The smallest multiple of 4 that fits a row of `width * num_channels`
/// bytes.
fn aligned_stride(width: u32, num_channels: u8) -> Option<usize> {
    if width == 0 || num_channels == 0 {
        return None;
    }

    let row = (width as usize).checked_mul(num_channels as usize)?;
    row.checked_add(3).map(|r| r & !3)
}

/// A 1-bit-per-pixel plane, rows padded to whole bytes, MSB first.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct BitRaster {
    width: u32,
    height: u32,
    row_bytes: usize,
    data: Vec<u8>,
}

impl BitRaster {
    /// Creates an all-clear plane. Returns `None` for zero dimensions or
    /// overflowing sizes.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }

        let row_bytes = (width as usize).checked_add(7)? / 8;
        let len = row_bytes.checked_mul(height as usize)?;

        Some(Self {
            width,
            height,
            row_bytes,
            data: vec![0; len],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        let (idx, bit) = self.position(x, y);
        self.data[idx] >> bit & 1 == 1
    }

    pub fn set(&mut self, x: u32, y: u32) {
        let (idx, bit) = self.position(x, y);
        self.data[idx] |= 1 << bit;
    }

    /// The number of set bits.
    pub fn set_count(&self) -> u64 {
        self.data.iter().map(|b| b.count_ones() as u64).sum()
    }

    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|b| *b == 0)
    }

    /// The rows as tightly packed 1-bpc image data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn position(&self, x: u32, y: u32) -> (usize, u32) {
        assert!(x < self.width && y < self.height);

        let idx = y as usize * self.row_bytes + x as usize / 8;
        (idx, 7 - x % 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_is_word_aligned() {
        assert_eq!(RasterBuffer::new(3, 1, 1).unwrap().stride(), 4);
        assert_eq!(RasterBuffer::new(2, 1, 4).unwrap().stride(), 8);
        assert_eq!(RasterBuffer::new(5, 1, 3).unwrap().stride(), 16);
        assert_eq!(RasterBuffer::new(1, 1, 4).unwrap().stride(), 4);
    }

    #[test]
    fn zero_geometry_is_rejected() {
        assert!(RasterBuffer::new(0, 4, 1).is_none());
        assert!(RasterBuffer::new(4, 0, 1).is_none());
        assert!(RasterBuffer::new(4, 4, 0).is_none());
        assert!(RasterBuffer::from_vec(4, 0, 1, vec![]).is_none());
        assert!(BitRaster::new(0, 1).is_none());
    }

    #[test]
    fn sample_indexing_is_interleaved() {
        let mut buf = RasterBuffer::new(2, 2, 3).unwrap();
        buf.set_sample(1, 1, 2, 0xAB);

        // Byte offset: y * stride + x * channels + channel.
        let idx = buf.stride() + 3 + 2;
        assert_eq!(buf.data()[idx], 0xAB);
        assert_eq!(buf.sample(1, 1, 2), 0xAB);
        assert_eq!(buf.pixel(1, 1), &[0, 0, 0xAB]);
    }

    #[test]
    fn from_vec_checks_length() {
        // 3 px * 1 channel rounds up to a stride of 4.
        assert!(RasterBuffer::from_vec(3, 2, 1, vec![0; 8]).is_some());
        assert!(RasterBuffer::from_vec(3, 2, 1, vec![0; 6]).is_none());
    }

    #[test]
    fn blankness_ignores_padding() {
        let mut data = vec![0u8; 8];
        data[3] = 0xFF;
        data[7] = 0xFF;

        let buf = RasterBuffer::from_vec(3, 2, 1, data).unwrap();
        assert!(buf.is_blank());
        assert_eq!(buf.nonzero_pixels(), 0);
    }

    #[test]
    fn packed_rows_strip_padding() {
        let mut buf = RasterBuffer::new(3, 2, 1).unwrap();
        buf.set_sample(0, 0, 0, 1);
        buf.set_sample(2, 1, 0, 2);

        assert_eq!(buf.packed_rows(), vec![1, 0, 0, 0, 0, 2]);
    }

    #[test]
    fn nonzero_pixels_counts_pixel_groups() {
        let mut buf = RasterBuffer::new(2, 2, 4).unwrap();
        buf.set_sample(0, 0, 1, 10);
        buf.set_sample(0, 0, 3, 20);
        buf.set_sample(1, 1, 0, 30);

        assert_eq!(buf.nonzero_pixels(), 2);
    }

    #[test]
    fn bits_are_msb_first() {
        let mut bits = BitRaster::new(10, 2).unwrap();
        bits.set(0, 0);
        bits.set(9, 1);

        assert_eq!(bits.data()[0], 0x80);
        assert_eq!(bits.data()[3], 0x40);
        assert!(bits.get(0, 0));
        assert!(bits.get(9, 1));
        assert!(!bits.get(1, 0));
        assert_eq!(bits.set_count(), 2);
    }
}
