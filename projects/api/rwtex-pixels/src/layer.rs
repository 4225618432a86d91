use rwtex_common::allocate::{AllocateError, PixelAllocator, TexelAlloc, TexelBuffer};

/// One level of a mip chain.
///
/// `width`/`height` are the storage dimensions (rounded up to multiples of 4
/// for compressed rasters). `layer_width`/`layer_height` are the logical
/// dimensions and never exceed the storage ones.
#[derive(Debug)]
pub struct MipmapLayer<'a> {
    pub texels: TexelBuffer<'a>,
    pub width: u32,
    pub height: u32,
    pub layer_width: u32,
    pub layer_height: u32,
}

impl<'a> MipmapLayer<'a> {
    /// A layer whose storage and logical dimensions are equal.
    pub fn new(texels: TexelBuffer<'a>, width: u32, height: u32) -> Self {
        Self {
            texels,
            width,
            height,
            layer_width: width,
            layer_height: height,
        }
    }

    pub fn owned(data: TexelAlloc, width: u32, height: u32) -> Self {
        Self::new(TexelBuffer::Owned(data), width, height)
    }

    pub fn borrowed(data: &'a [u8], width: u32, height: u32) -> Self {
        Self::new(TexelBuffer::Borrowed(data), width, height)
    }

    /// Overrides the logical dimensions.
    pub fn with_layer_size(mut self, layer_width: u32, layer_height: u32) -> Self {
        self.layer_width = layer_width.min(self.width);
        self.layer_height = layer_height.min(self.height);
        self
    }

    /// Byte length of the texel buffer.
    #[inline]
    pub fn data_size(&self) -> usize {
        self.texels.len()
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        self.texels.as_slice()
    }

    /// A copy of this layer that owns its texels.
    pub fn to_owned_layer(
        &self,
        allocator: &dyn PixelAllocator,
    ) -> Result<MipmapLayer<'static>, AllocateError> {
        Ok(MipmapLayer {
            texels: TexelBuffer::copy_from(allocator, self.texels.as_slice())?,
            width: self.width,
            height: self.height,
            layer_width: self.layer_width,
            layer_height: self.layer_height,
        })
    }
}
