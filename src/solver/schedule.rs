use crate::object::ConstraintHandle;

/// Constraints grouped by level then by color.
///
/// Levels must be processed in increasing order. Within a level, the colors are processed one
/// after the other, and the constraints of a single color share no dynamic body so they can be
/// solved concurrently.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorSchedule<C> {
    levels: Vec<Vec<Vec<C>>>,
}

impl<C: ConstraintHandle> ColorSchedule<C> {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        ColorSchedule { levels: Vec::new() }
    }

    /// Creates a schedule from buckets indexed by level then by color.
    pub fn from_buckets(levels: Vec<Vec<Vec<C>>>) -> Self {
        ColorSchedule { levels }
    }

    /// Merges the buckets of an island into this schedule.
    ///
    /// Distinct islands share no dynamic body, so their buckets can be merged color-wise.
    pub fn append_island(&mut self, levels: &[Vec<Vec<C>>]) {
        if self.levels.len() < levels.len() {
            self.levels.resize_with(levels.len(), Vec::new);
        }

        for (dst, src) in self.levels.iter_mut().zip(levels.iter()) {
            if dst.len() < src.len() {
                dst.resize_with(src.len(), Vec::new);
            }

            for (dst, src) in dst.iter_mut().zip(src.iter()) {
                dst.extend_from_slice(src);
            }
        }
    }

    /// Removes all constraints from this schedule.
    pub fn clear(&mut self) {
        self.levels.clear()
    }

    /// The number of levels of this schedule.
    #[inline]
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// The number of colors of the given level.
    #[inline]
    pub fn num_colors(&self, level: usize) -> usize {
        self.levels.get(level).map_or(0, |l| l.len())
    }

    /// The constraints with the given level and color.
    #[inline]
    pub fn bucket(&self, level: usize, color: usize) -> &[C] {
        self.levels
            .get(level)
            .and_then(|l| l.get(color))
            .map_or(&[][..], |b| &b[..])
    }

    /// The total number of constraints of this schedule.
    pub fn len(&self) -> usize {
        self.levels.iter().flatten().map(|b| b.len()).sum()
    }

    /// Returns `true` if this schedule contains no constraint.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Applies `f` to every non-empty bucket, in execution order.
    pub fn for_each_bucket(&self, mut f: impl FnMut(usize, usize, &[C])) {
        for (level, colors) in self.levels.iter().enumerate() {
            for (color, bucket) in colors.iter().enumerate() {
                if !bucket.is_empty() {
                    f(level, color, &bucket[..])
                }
            }
        }
    }

    /// Applies `f` to every constraint, in parallel within each bucket.
    ///
    /// Buckets are processed one after the other, in execution order.
    #[cfg(feature = "parallel")]
    pub fn par_for_each_constraint(&self, f: impl Fn(usize, usize, &C) + Sync + Send) {
        use rayon::prelude::*;

        self.for_each_bucket(|level, color, bucket| {
            bucket.par_iter().for_each(|c| f(level, color, c))
        })
    }
}

impl<C: ConstraintHandle> Default for ColorSchedule<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::ColorSchedule;

    #[test]
    fn islands_are_merged_per_bucket() {
        let mut schedule = ColorSchedule::new();
        schedule.append_island(&[vec![vec![0u32, 1], vec![2]]]);
        schedule.append_island(&[vec![vec![3]], vec![vec![], vec![4]]]);

        assert_eq!(schedule.num_levels(), 2);
        assert_eq!(schedule.bucket(0, 0), &[0, 1, 3]);
        assert_eq!(schedule.bucket(0, 1), &[2]);
        assert_eq!(schedule.bucket(1, 0), &[] as &[u32]);
        assert_eq!(schedule.bucket(1, 1), &[4]);
        assert_eq!(schedule.bucket(5, 5), &[] as &[u32]);
        assert_eq!(schedule.len(), 5);

        let mut visited = Vec::new();
        schedule.for_each_bucket(|level, color, bucket| visited.push((level, color, bucket.len())));
        assert_eq!(visited, vec![(0, 0, 3), (0, 1, 1), (1, 1, 1)]);
    }
}
