/// One flat float attribute as uploaded to the GPU: `count * item_size`
/// floats plus a "needs update" flag the renderer polls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloatAttribute {
    data: Vec<f32>,
    item_size: usize,
    needs_update: bool,
}

impl FloatAttribute {
    /// Wrap existing data. New attributes start dirty so the first frame
    /// uploads them.
    pub fn new(data: Vec<f32>, item_size: usize) -> Self {
        let item_size = item_size.max(1);
        debug_assert_eq!(data.len() % item_size, 0);
        Self {
            data,
            item_size,
            needs_update: true,
        }
    }

    pub fn filled(count: usize, item_size: usize, value: f32) -> Self {
        Self::new(vec![value; count * item_size.max(1)], item_size)
    }

    /// Number of items (nodes or vertices), not floats.
    pub fn count(&self) -> usize {
        self.data.len() / self.item_size
    }

    pub fn item_size(&self) -> usize {
        self.item_size
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Mutable view of the raw floats. Callers mark the attribute dirty once
    /// their write is complete.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn item(&self, index: usize) -> &[f32] {
        let start = index * self.item_size;
        &self.data[start..start + self.item_size]
    }

    pub fn mark_dirty(&mut self) {
        self.needs_update = true;
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Consume the dirty flag. Returns whether an upload is due.
    pub fn take_needs_update(&mut self) -> bool {
        std::mem::take(&mut self.needs_update)
    }
}
