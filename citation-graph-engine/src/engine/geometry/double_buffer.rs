/// Two owned buffers behind a front index. Writers only ever touch the back
/// buffer; `swap` publishes it in one step, so readers of `front` never see
/// a partially written array.
#[derive(Debug, Clone)]
pub struct DoubleBuffer<T> {
    buffers: [Vec<T>; 2],
    front: usize,
    needs_update: bool,
}

impl<T: Clone> DoubleBuffer<T> {
    pub fn new(initial: Vec<T>) -> Self {
        Self {
            buffers: [initial.clone(), initial],
            front: 0,
            needs_update: true,
        }
    }
}

impl<T> DoubleBuffer<T> {
    /// Buffer currently bound to the live geometry.
    pub fn front(&self) -> &[T] {
        &self.buffers[self.front]
    }

    /// Buffer that will be published by the next swap.
    pub fn back(&self) -> &[T] {
        &self.buffers[1 - self.front]
    }

    pub fn back_mut(&mut self) -> &mut Vec<T> {
        &mut self.buffers[1 - self.front]
    }

    /// Index (0 or 1) of the front buffer.
    pub fn front_index(&self) -> usize {
        self.front
    }

    /// Publish the back buffer and flag it for upload.
    pub fn swap(&mut self) {
        self.front = 1 - self.front;
        self.needs_update = true;
    }

    pub fn take_needs_update(&mut self) -> bool {
        std::mem::take(&mut self.needs_update)
    }
}
