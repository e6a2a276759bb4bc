//! Union-find over dense indices, with path compression and union by rank.

/// A node of a union-find forest.
#[derive(Copy, Clone, Debug)]
pub struct UnionFindSet {
    parent: usize,
    rank: usize,
}

impl UnionFindSet {
    /// Creates a set containing only `key`.
    #[inline]
    pub fn new(key: usize) -> UnionFindSet {
        UnionFindSet {
            parent: key,
            rank: 0,
        }
    }

    /// Resets this set so it only contains `key`.
    #[inline]
    pub fn reinit(&mut self, key: usize) {
        self.parent = key;
        self.rank = 0;
    }
}

/// Finds the root of the set containing `x`.
pub fn find(mut x: usize, sets: &mut [UnionFindSet]) -> usize {
    let mut root = x;

    while sets[root].parent != root {
        root = sets[root].parent;
    }

    while sets[x].parent != root {
        let next = sets[x].parent;
        sets[x].parent = root;
        x = next;
    }

    root
}

/// Merges the sets containing `x` and `y`.
pub fn union(x: usize, y: usize, sets: &mut [UnionFindSet]) {
    let x_root = find(x, sets);
    let y_root = find(y, sets);

    if x_root == y_root {
        return;
    }

    let rankx = sets[x_root].rank;
    let ranky = sets[y_root].rank;

    if rankx < ranky {
        sets[x_root].parent = y_root
    } else if rankx > ranky {
        sets[y_root].parent = x_root
    } else {
        sets[y_root].parent = x_root;
        sets[x_root].rank = rankx + 1
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn union_find_merges_transitively() {
        let mut sets: Vec<_> = (0..6).map(UnionFindSet::new).collect();
        union(0, 1, &mut sets);
        union(3, 4, &mut sets);
        union(1, 4, &mut sets);

        let root = find(0, &mut sets);
        assert_eq!(find(3, &mut sets), root);
        assert_eq!(find(4, &mut sets), root);
        assert_ne!(find(2, &mut sets), root);
        assert_ne!(find(5, &mut sets), find(2, &mut sets));
    }
}
