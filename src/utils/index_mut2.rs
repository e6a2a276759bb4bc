use std::ops::IndexMut;

/// Mutable access to two distinct elements of a collection at once.
pub trait IndexMut2<I>: IndexMut<I> {
    /// Gets mutable references to the elements `i` and `j`, which must be distinct.
    fn index_mut2(&mut self, i: usize, j: usize) -> (&mut Self::Output, &mut Self::Output);
}

impl<T> IndexMut2<usize> for Vec<T> {
    #[inline]
    fn index_mut2(&mut self, i: usize, j: usize) -> (&mut T, &mut T) {
        assert!(i != j, "Unable to index the same element twice.");

        if i < j {
            let (left, right) = self.split_at_mut(j);
            (&mut left[i], &mut right[0])
        } else {
            let (left, right) = self.split_at_mut(i);
            (&mut right[0], &mut left[j])
        }
    }
}
