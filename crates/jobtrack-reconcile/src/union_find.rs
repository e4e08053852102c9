//! Disjoint-set forest with path compression and union by rank.

#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Joins the sets holding `a` and `b`; false if they were already joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] = self.rank[ra].saturating_add(1);
            }
        }
        true
    }

    /// Sets with at least two elements, each sorted ascending, ordered by
    /// their smallest element.
    pub fn components(&mut self) -> Vec<Vec<usize>> {
        let mut by_root: Vec<Option<usize>> = vec![None; self.len()];
        let mut components: Vec<Vec<usize>> = Vec::new();
        for x in 0..self.len() {
            let root = self.find(x);
            match by_root[root] {
                Some(slot) => components[slot].push(x),
                None => {
                    by_root[root] = Some(components.len());
                    components.push(vec![x]);
                }
            }
        }
        components.retain(|members| members.len() > 1);
        components
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_is_transitive() {
        let mut set = DisjointSet::new(5);
        assert!(set.union(0, 3));
        assert!(set.union(3, 4));
        assert!(!set.union(0, 4));
        assert_eq!(set.find(0), set.find(4));
        assert_ne!(set.find(1), set.find(0));
        assert_eq!(set.components(), vec![vec![0, 3, 4]]);
    }

    #[test]
    fn components_are_ordered_by_smallest_member() {
        let mut set = DisjointSet::new(6);
        set.union(4, 5);
        set.union(3, 1);
        assert_eq!(set.components(), vec![vec![1, 3], vec![4, 5]]);
        assert!(DisjointSet::new(0).components().is_empty());
    }
}
