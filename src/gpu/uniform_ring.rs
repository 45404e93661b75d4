//! Growable uniform buffer addressed by dynamic offsets.
//!
//! Every pass of a frame gets its own fixed-size slot. Blocks are staged on
//! the CPU while a chain runs and written before encoding, so passes of the
//! same program that share a command buffer each see their own values.
//! Slots keep growing across uploads until [`UniformRing::reset`], so
//! several chains can be recorded before one submit without overwriting
//! each other's blocks.

use std::num::NonZeroU64;

use crate::fx::uniform::{UniformError, UniformLayout, UniformSet};

/// Bytes reserved per slot. Matches the common
/// `min_uniform_buffer_offset_alignment`.
pub const SLOT_STRIDE: u64 = 256;

/// Uniform blocks staged on the CPU, one per stride-sized slot.
#[derive(Debug, Clone)]
pub struct StagedBlocks {
    stride: usize,
    bytes: Vec<u8>,
    /// Bytes already written to the GPU.
    flushed: usize,
}

impl StagedBlocks {
    /// Empty staging area with `stride`-byte slots.
    #[must_use]
    pub const fn new(stride: usize) -> Self {
        Self {
            stride,
            bytes: Vec::new(),
            flushed: 0,
        }
    }

    /// Pack `set` per `layout` into a fresh slot and return its byte offset.
    ///
    /// # Errors
    ///
    /// Returns [`UniformError`] when `set` does not fit `layout` or the block
    /// is larger than a slot. Nothing is staged on failure.
    pub fn push(
        &mut self,
        layout: &UniformLayout,
        set: &UniformSet,
    ) -> Result<u32, UniformError> {
        let offset = self.bytes.len();
        self.bytes.resize(offset + self.stride, 0);
        if let Err(e) = layout.pack(set, &mut self.bytes[offset..]) {
            self.bytes.truncate(offset);
            return Err(e);
        }
        Ok(offset as u32)
    }

    /// Slots staged so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len() / self.stride
    }

    /// True when nothing is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Drop every staged slot.
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.flushed = 0;
    }

    /// Drop slots past the first `len` bytes.
    pub fn truncate(&mut self, len: usize) {
        self.bytes.truncate(len);
        self.flushed = self.flushed.min(self.bytes.len());
    }

    /// Byte offset and contents of the slots not yet written to the GPU.
    #[must_use]
    pub fn pending(&self) -> (u64, &[u8]) {
        (self.flushed as u64, &self.bytes[self.flushed..])
    }

    /// Record every staged slot as written.
    pub fn mark_flushed(&mut self) {
        self.flushed = self.bytes.len();
    }

    /// Staged bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Uniform ring with 2x growth, never shrinking.
pub struct UniformRing {
    buffer: wgpu::Buffer,
    capacity: u64,
    staged: StagedBlocks,
    label: String,
}

impl UniformRing {
    /// Ring with room for `initial_slots` blocks.
    pub fn new(device: &wgpu::Device, label: &str, initial_slots: u64) -> Self {
        let stride = SLOT_STRIDE.max(u64::from(
            device.limits().min_uniform_buffer_offset_alignment,
        ));
        let capacity = stride * initial_slots.max(1);
        Self {
            buffer: create(device, label, capacity),
            capacity,
            staged: StagedBlocks::new(stride as usize),
            label: label.to_owned(),
        }
    }

    /// Size each slot binds.
    pub fn binding_size(&self) -> Option<NonZeroU64> {
        NonZeroU64::new(self.staged.stride as u64)
    }

    /// Blocks staged for the frame being recorded.
    pub fn staged_mut(&mut self) -> &mut StagedBlocks {
        &mut self.staged
    }

    /// Write blocks staged since the last upload to the GPU, growing the
    /// buffer if needed. A grown buffer receives every staged block.
    ///
    /// Returns `true` if the buffer was reallocated.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> bool {
        let needed = self.staged.as_bytes().len() as u64;
        let reallocated = if needed > self.capacity {
            let new_capacity = (needed * 2).max(self.capacity + SLOT_STRIDE * 4);
            self.buffer = create(device, &self.label, new_capacity);
            log::debug!(
                "{}: grew {} -> {} bytes",
                self.label,
                self.capacity,
                new_capacity
            );
            self.capacity = new_capacity;
            true
        } else {
            false
        };

        let (offset, bytes) = if reallocated {
            (0, self.staged.as_bytes())
        } else {
            self.staged.pending()
        };
        if !bytes.is_empty() {
            queue.write_buffer(&self.buffer, offset, bytes);
        }
        self.staged.mark_flushed();
        reallocated
    }

    /// Start over at slot zero. Call once the command buffers that read the
    /// current blocks have been submitted.
    pub fn reset(&mut self) {
        self.staged.clear();
    }

    /// The backing buffer.
    pub const fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Capacity in bytes.
    pub const fn capacity(&self) -> u64 {
        self.capacity
    }
}

fn create(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::fx::slot::{ShaderSlot, STRENGTH_LAYOUT};

    #[test]
    fn each_block_gets_its_own_slot() {
        let mut staged = StagedBlocks::new(SLOT_STRIDE as usize);
        let mut set = UniformSet::new();
        set.set("offset", Vec2::new(2.0, 0.0));
        let first = staged.push(ShaderSlot::BlurLow.layout(), &set).unwrap();
        set.set("offset", Vec2::new(0.0, 2.0));
        let second = staged.push(ShaderSlot::BlurLow.layout(), &set).unwrap();

        assert_eq!(first, 0);
        assert_eq!(second, 256);
        assert_eq!(staged.len(), 2);

        let read = |at: usize| {
            let b = &staged.as_bytes()[at..at + 4];
            f32::from_ne_bytes([b[0], b[1], b[2], b[3]])
        };
        // offset.x / offset.y live at bytes 8 and 12 of the blur block.
        assert_eq!(read(8), 2.0);
        assert_eq!(read(12), 0.0);
        assert_eq!(read(256 + 8), 0.0);
        assert_eq!(read(256 + 12), 2.0);
    }

    #[test]
    fn pending_covers_only_unflushed_slots() {
        let mut staged = StagedBlocks::new(SLOT_STRIDE as usize);
        let mut set = UniformSet::new();
        set.set("strength", 1.0_f32);
        let _ = staged.push(&STRENGTH_LAYOUT, &set).unwrap();
        assert_eq!(staged.pending().0, 0);
        assert_eq!(staged.pending().1.len(), 256);

        staged.mark_flushed();
        assert!(staged.pending().1.is_empty());

        let second = staged.push(&STRENGTH_LAYOUT, &set).unwrap();
        assert_eq!(second, 256);
        let (offset, bytes) = staged.pending();
        assert_eq!((offset, bytes.len()), (256, 256));

        staged.truncate(256);
        assert_eq!(staged.len(), 1);
        assert!(staged.pending().1.is_empty());

        staged.clear();
        assert_eq!(staged.pending(), (0, &[][..]));
    }

    #[test]
    fn failed_push_stages_nothing() {
        let mut staged = StagedBlocks::new(SLOT_STRIDE as usize);
        let mut set = UniformSet::new();
        set.set("nope", 1.0_f32);
        assert!(staged.push(&STRENGTH_LAYOUT, &set).is_err());
        assert!(staged.is_empty());
    }

    #[test]
    fn oversized_block_is_rejected() {
        let mut staged = StagedBlocks::new(16);
        let err = staged
            .push(ShaderSlot::Glow.layout(), &UniformSet::new())
            .unwrap_err();
        assert!(matches!(err, UniformError::BufferTooSmall { needed: 48, available: 16 }));
        staged.clear();
        assert_eq!(staged.len(), 0);
    }
}
