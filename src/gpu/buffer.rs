//! GPU buffers mirrored from CPU-side arrays.
//!
//! Vertex, index and per-instance attribute data all go through
//! [`GpuBuffer`]. Buffers grow (2x) when written with more data than they
//! hold but never shrink; the splash pool is fixed-size, so in practice
//! only the first write allocates.

use wgpu::util::DeviceExt;

/// Smallest buffer ever allocated, so empty streams still bind.
const MIN_BUFFER_BYTES: usize = 16;

/// A GPU buffer plus its allocated size.
pub struct GpuBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
    usage: wgpu::BufferUsages,
    label: String,
}

impl GpuBuffer {
    /// Buffer initialized from `data`. `COPY_DST` is always added to
    /// `usage`.
    pub fn new_with_data<T: bytemuck::Pod>(
        device: &wgpu::Device,
        label: &str,
        data: &[T],
        usage: wgpu::BufferUsages,
    ) -> Self {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let usage = usage | wgpu::BufferUsages::COPY_DST;

        // Zero-pad small payloads so empty or tiny streams still bind.
        let mut padded;
        let contents = if bytes.len() < MIN_BUFFER_BYTES {
            padded = bytes.to_vec();
            padded.resize(MIN_BUFFER_BYTES, 0);
            &padded[..]
        } else {
            bytes
        };

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage,
        });

        Self {
            buffer,
            capacity: contents.len(),
            usage,
            label: label.to_owned(),
        }
    }

    /// Write raw bytes, growing if necessary.
    ///
    /// Returns `true` if the buffer was reallocated (bind groups and
    /// cached slices need recreation).
    pub fn write_bytes(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[u8]) -> bool {
        let needed = data.len();

        let reallocated = if needed > self.capacity {
            let new_capacity = (needed * 2).max(self.capacity + MIN_BUFFER_BYTES);

            self.buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&self.label),
                size: new_capacity as u64,
                usage: self.usage,
                mapped_at_creation: false,
            });

            self.capacity = new_capacity;
            true
        } else {
            false
        };

        if needed > 0 {
            queue.write_buffer(&self.buffer, 0, data);
        }

        reallocated
    }

    /// Typed convenience over [`write_bytes`](Self::write_bytes).
    pub fn write<T: bytemuck::Pod>(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[T]) -> bool {
        self.write_bytes(device, queue, bytemuck::cast_slice(data))
    }

    /// The underlying `wgpu::Buffer`.
    #[must_use]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}
