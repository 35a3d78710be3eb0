use std::ops::Range;

use super::GeometryError;
use super::attribute::FloatAttribute;
use super::nodes::ClusterId;

/// One citation, drawn as a polyline over a contiguous vertex range.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRecord {
    pub id: u32,
    pub source: u32,
    pub target: u32,
    /// Resolved publication year: the edge's own year, or the later endpoint
    /// year when the dataset has none.
    pub year: Option<i32>,
    pub source_cluster: Option<ClusterId>,
    pub target_cluster: Option<ClusterId>,
    /// Half-open `[start, end)` slice of the shared edge vertex buffers.
    pub vertex_range: Range<u32>,
}

impl EdgeRecord {
    pub fn vertex_slots(&self) -> Range<usize> {
        self.vertex_range.start as usize..self.vertex_range.end as usize
    }
}

/// Edge records, their per-vertex attribute buffers and the full detail
/// segment index buffer (pairs of vertex indices, line list).
#[derive(Debug, Clone)]
pub struct EdgeGeometry {
    records: Vec<EdgeRecord>,
    malformed: Vec<bool>,
    segment_indices: Vec<u32>,
    pub position: FloatAttribute,
    pub color: FloatAttribute,
    pub visible: FloatAttribute,
}

impl EdgeGeometry {
    /// Validate vertex ranges against the vertex buffers: ranges must be
    /// non-empty, ascending in load order, non-overlapping and in bounds.
    pub fn new(
        records: Vec<EdgeRecord>,
        mut positions: Vec<f32>,
        colors: Vec<f32>,
    ) -> Result<Self, GeometryError> {
        if positions.len() % 3 != 0 {
            return Err(GeometryError::AttributeLength {
                attribute: "edge position",
                expected: positions.len() - positions.len() % 3,
                actual: positions.len(),
            });
        }
        if colors.len() != positions.len() {
            return Err(GeometryError::AttributeLength {
                attribute: "edge colour",
                expected: positions.len(),
                actual: colors.len(),
            });
        }

        let vertex_count = (positions.len() / 3) as u32;
        let mut previous_end = 0;
        for record in &records {
            let Range { start, end } = record.vertex_range;
            if start >= end {
                return Err(GeometryError::EmptyVertexRange {
                    edge_id: record.id,
                    start,
                    end,
                });
            }
            if start < previous_end {
                return Err(GeometryError::OverlappingVertexRange {
                    edge_id: record.id,
                    start,
                    previous_end,
                });
            }
            if end > vertex_count {
                return Err(GeometryError::VertexRangeOutOfBounds {
                    edge_id: record.id,
                    end,
                    vertex_count,
                });
            }
            previous_end = end;
        }

        let malformed: Vec<bool> = records
            .iter()
            .map(|record| {
                positions[record.vertex_slots().start * 3..record.vertex_slots().end * 3]
                    .iter()
                    .any(|v| !v.is_finite())
            })
            .collect();

        // Malformed edges collapse to the origin so the vertex stage never
        // sees inf/NaN; they stay hidden through `visible`.
        for (record, _) in records.iter().zip(&malformed).filter(|(_, bad)| **bad) {
            positions[record.vertex_slots().start * 3..record.vertex_slots().end * 3].fill(0.0);
        }
        for value in positions.iter_mut().filter(|v| !v.is_finite()) {
            *value = 0.0;
        }

        let segment_indices = records
            .iter()
            .flat_map(|record| {
                (record.vertex_range.start..record.vertex_range.end - 1).flat_map(|v| [v, v + 1])
            })
            .collect();

        let vertex_count = vertex_count as usize;
        Ok(Self {
            records,
            malformed,
            segment_indices,
            position: FloatAttribute::new(positions, 3),
            color: FloatAttribute::new(colors, 3),
            visible: FloatAttribute::filled(vertex_count, 1, 1.0),
        })
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.position.count()
    }

    pub fn records(&self) -> &[EdgeRecord] {
        &self.records
    }

    /// Whether any vertex of edge `index` has a non-finite coordinate.
    pub fn is_malformed(&self, index: usize) -> bool {
        self.malformed.get(index).copied().unwrap_or(true)
    }

    pub fn malformed_count(&self) -> usize {
        self.malformed.iter().filter(|m| **m).count()
    }

    /// Full detail line-list indices, two per segment.
    pub fn segment_indices(&self) -> &[u32] {
        &self.segment_indices
    }
}
