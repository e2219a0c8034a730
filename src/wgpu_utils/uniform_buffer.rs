// src/wgpu_utils/uniform_buffer.rs
use std::{marker::PhantomData, num::NonZeroU64};

/// Rounds `size` up to the next multiple of `alignment`
pub fn align_to(size: u64, alignment: u64) -> u64 {
    if alignment == 0 {
        return size;
    }
    size.div_ceil(alignment) * alignment
}

/// Uniform buffer holding one `Content` block per draw
///
/// Blocks sit `stride` bytes apart so each can be bound with a dynamic
/// offset. The buffer grows on demand; growing replaces the GPU buffer, so
/// any bind group built from it must be rebuilt.
pub struct DynamicUniformBuffer<Content> {
    buffer: wgpu::Buffer,
    content_type: PhantomData<Content>,
    stride: u64,
    capacity: usize,
    staging: Vec<u8>,
}

impl<Content: bytemuck::Pod> DynamicUniformBuffer<Content> {
    fn name() -> &'static str {
        let type_name = std::any::type_name::<Content>();
        let pos = type_name.rfind(':').unwrap_or(0);
        if pos > 0 {
            &type_name[(pos + 1)..]
        } else {
            type_name
        }
    }

    fn create_buffer(device: &wgpu::Device, stride: u64, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("DynamicUniformBuffer: {}", Self::name())),
            size: stride * capacity.max(1) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// `alignment` is the device's `min_uniform_buffer_offset_alignment`
    pub fn new(device: &wgpu::Device, alignment: u32, capacity: usize) -> Self {
        let stride = align_to(Self::element_size(), alignment as u64);
        let capacity = capacity.max(1);
        DynamicUniformBuffer {
            buffer: Self::create_buffer(device, stride, capacity),
            content_type: PhantomData,
            stride,
            capacity,
            staging: Vec::new(),
        }
    }

    pub fn element_size() -> u64 {
        std::mem::size_of::<Content>() as u64
    }

    /// Grows to hold at least `count` blocks; true if the buffer was replaced
    pub fn ensure_capacity(&mut self, device: &wgpu::Device, count: usize) -> bool {
        if count <= self.capacity {
            return false;
        }
        let capacity = count.next_power_of_two();
        self.buffer.destroy();
        self.buffer = Self::create_buffer(device, self.stride, capacity);
        self.capacity = capacity;
        true
    }

    /// Writes `contents` as consecutive blocks starting at offset zero
    pub fn write(&mut self, queue: &wgpu::Queue, contents: &[Content]) {
        if contents.is_empty() {
            return;
        }
        let stride = self.stride as usize;
        self.staging.clear();
        self.staging.resize(stride * contents.len(), 0);
        for (block, content) in self.staging.chunks_exact_mut(stride).zip(contents) {
            let bytes = bytemuck::bytes_of(content);
            block[..bytes.len()].copy_from_slice(bytes);
        }
        queue.write_buffer(&self.buffer, 0, &self.staging);
    }

    /// Dynamic offset of block `index`
    pub fn offset(&self, index: usize) -> u32 {
        (self.stride * index as u64) as u32
    }

    /// Binding covering a single block; the dynamic offset selects which
    pub fn binding_resource(&self) -> wgpu::BindingResource {
        wgpu::BindingResource::Buffer(wgpu::BufferBinding {
            buffer: &self.buffer,
            offset: 0,
            size: NonZeroU64::new(Self::element_size()),
        })
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
