//! Offscreen render targets for the effect chain.

/// A render-target texture and its default view.
///
/// Created with `RENDER_ATTACHMENT | TEXTURE_BINDING | COPY_SRC | COPY_DST`
/// so a target can be drawn into, sampled, copied from and uploaded to.
pub struct RenderTarget {
    /// The underlying GPU texture.
    pub texture: wgpu::Texture,
    /// A default full-texture view.
    pub view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl RenderTarget {
    /// Create a render target with the given dimensions and format.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    /// Width in pixels.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Full texture extent.
    pub const fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }

    /// Upload tightly packed 4-byte pixels covering the whole target.
    ///
    /// Returns `false` (and uploads nothing) when `pixels` is not exactly
    /// `width * height * 4` bytes.
    pub fn write_pixels(&self, queue: &wgpu::Queue, pixels: &[u8]) -> bool {
        let expected = self.width as usize * self.height as usize * 4;
        if pixels.len() != expected {
            log::warn!(
                "pixel upload of {} bytes ignored, target needs {expected}",
                pixels.len()
            );
            return false;
        }
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.width * 4),
                rows_per_image: Some(self.height),
            },
            self.extent(),
        );
        true
    }
}

/// Handle of one of the three targets in a [`RenderTargetSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(u8);

impl TargetId {
    /// The three handles in source, target, swap order.
    pub const ALL: [Self; 3] = [Self(0), Self(1), Self(2)];

    /// Position in the set.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The three same-sized targets one chain evaluation ping-pongs between.
pub struct RenderTargetSet {
    targets: [RenderTarget; 3],
}

impl RenderTargetSet {
    /// Allocate three `width` x `height` targets of `format`.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        let make = |label| RenderTarget::new(device, label, width, height, format);
        Self {
            targets: [make("FX Target 0"), make("FX Target 1"), make("FX Target 2")],
        }
    }

    /// Handles in source, target, swap order.
    #[must_use]
    pub const fn ids(&self) -> [TargetId; 3] {
        TargetId::ALL
    }

    /// The target named by `id`.
    #[must_use]
    pub const fn get(&self, id: TargetId) -> &RenderTarget {
        &self.targets[id.index()]
    }

    /// The target the chain reads its input from.
    #[must_use]
    pub const fn input(&self) -> &RenderTarget {
        &self.targets[0]
    }

    /// Width shared by all three targets.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.targets[0].width
    }

    /// Height shared by all three targets.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.targets[0].height
    }

    /// Reallocate for a new size. Does nothing when the size is unchanged or
    /// zero.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == (self.width(), self.height()) {
            return;
        }
        let format = self.targets[0].texture.format();
        *self = Self::new(device, width, height, format);
    }

    /// Texture format shared by all three targets.
    #[must_use]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.targets[0].texture.format()
    }
}
