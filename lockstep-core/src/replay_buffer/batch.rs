//! Batch storage.
use crate::Trajectory;

/// A trait defining basic batch storage operations.
///
/// Implementors hold a fixed-capacity column of batched data and support
/// writing a contiguous run of elements and gathering arbitrary indices.
/// The replay buffer stores its observation, action and state columns
/// through this trait.
pub trait BatchBase {
    /// Creates a storage with the specified capacity, in elements.
    fn new(capacity: usize) -> Self;

    /// Writes the elements of `data` starting at index `ix`, wrapping at the
    /// capacity.
    fn push(&mut self, ix: usize, data: Self);

    /// Gathers the elements at the given indices into a new batch.
    fn sample(&self, ixs: &[usize]) -> Self;
}

impl<T: Clone + Default> BatchBase for Vec<T> {
    fn new(capacity: usize) -> Self {
        vec![T::default(); capacity]
    }

    fn push(&mut self, ix: usize, data: Self) {
        let capacity = self.len();
        let mut j = ix;
        for x in data.into_iter() {
            self[j] = x;
            j += 1;
            if j == capacity {
                j = 0;
            }
        }
    }

    fn sample(&self, ixs: &[usize]) -> Self {
        ixs.iter().map(|ix| self[*ix].clone()).collect()
    }
}

/// State column of a stateless agent.
impl BatchBase for () {
    fn new(_capacity: usize) -> Self {}

    fn push(&mut self, _ix: usize, _data: Self) {}

    fn sample(&self, _ixs: &[usize]) -> Self {}
}

/// A time-major stack of sampled windows.
///
/// `steps[0]` is the earliest transition of every window; the temporal
/// order inside a window is guaranteed, the order across windows is not.
/// The batch dimension of each row is the number of sampled windows, not
/// the lane count of the originating buffer.
#[derive(Debug)]
pub struct TrajectoryWindow<O, A, S> {
    /// Time-major rows of the stacked windows.
    pub steps: Vec<Trajectory<O, A, S>>,
}

impl<O, A, S> TrajectoryWindow<O, A, S> {
    /// Window length in steps.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

#[cfg(test)]
mod tests {
    use super::BatchBase;

    #[test]
    fn vec_push_wraps_at_capacity() {
        let mut storage = <Vec<i64> as BatchBase>::new(4);
        BatchBase::push(&mut storage, 2, vec![1, 2, 3]);
        assert_eq!(storage, vec![3, 0, 1, 2]);
    }

    #[test]
    fn vec_sample_gathers_indices() {
        let mut storage = <Vec<i64> as BatchBase>::new(3);
        BatchBase::push(&mut storage, 0, vec![10, 20, 30]);
        assert_eq!(storage.sample(&[2, 0, 2]), vec![30, 10, 30]);
    }
}
