use crate::selection::SelectionError;

#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub id: usize,
    /// Squared L2 distance.
    pub distance: f32,
}

/// Exhaustive nearest-neighbor index over fixed-dimension vectors.
/// Ids are insertion positions.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dim: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIndex {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            vectors: Vec::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn add(&mut self, vector: Vec<f32>) -> Result<usize, SelectionError> {
        self.check_dim(&vector)?;
        self.vectors.push(vector);
        Ok(self.vectors.len() - 1)
    }

    /// The `k` closest vectors, nearest first. Equal distances keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, SelectionError> {
        self.check_dim(query)?;
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let mut hits: Vec<Neighbor> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(id, v)| Neighbor {
                id,
                distance: squared_l2(query, v),
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.id.cmp(&b.id)));
        hits.truncate(k);
        Ok(hits)
    }

    fn check_dim(&self, v: &[f32]) -> Result<(), SelectionError> {
        if v.len() != self.dim {
            return Err(SelectionError::Dimension {
                expected: self.dim,
                actual: v.len(),
            });
        }
        Ok(())
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_orders_by_distance() {
        let mut index = FlatIndex::new(2);
        index.add(vec![10.0, 10.0]).unwrap();
        index.add(vec![1.0, 0.0]).unwrap();
        index.add(vec![0.0, 3.0]).unwrap();

        let hits = index.search(&[0.0, 0.0], 3).unwrap();
        let ids: Vec<_> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![1, 2, 0]);
        assert_eq!(hits[0].distance, 1.0);
        assert_eq!(hits[1].distance, 9.0);
    }

    #[test]
    fn test_search_truncates_to_k() {
        let mut index = FlatIndex::new(1);
        for x in 0..5 {
            index.add(vec![x as f32]).unwrap();
        }
        assert_eq!(index.search(&[0.0], 2).unwrap().len(), 2);
        assert_eq!(index.search(&[0.0], 10).unwrap().len(), 5);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut index = FlatIndex::new(1);
        index.add(vec![1.0]).unwrap();
        index.add(vec![-1.0]).unwrap();
        let hits = index.search(&[0.0], 2).unwrap();
        assert_eq!(hits[0].id, 0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut index = FlatIndex::new(3);
        assert!(matches!(
            index.add(vec![1.0]),
            Err(SelectionError::Dimension {
                expected: 3,
                actual: 1
            })
        ));
        assert!(index.search(&[1.0, 2.0], 1).is_err());
    }

    #[test]
    fn test_empty_index_search_is_empty() {
        let index = FlatIndex::new(2);
        assert!(index.is_empty());
        assert!(index.search(&[0.0, 0.0], 1).unwrap().is_empty());
    }
}
