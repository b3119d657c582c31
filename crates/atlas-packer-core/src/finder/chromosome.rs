use rand::Rng;
use rand::seq::SliceRandom;

/// One candidate layout: a placement order plus a trial box width, given as
/// an index into the candidate width list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chromosome {
    pub order: Vec<usize>,
    pub width_idx: usize,
    /// Bounding-box area of the decoded layout; `i64::MAX` when unplaceable.
    pub fitness: i64,
}

impl Chromosome {
    pub fn new(order: Vec<usize>, width_idx: usize) -> Self {
        Self {
            order,
            width_idx,
            fitness: i64::MAX,
        }
    }

    pub fn random<R: Rng>(size: usize, widths: usize, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..size).collect();
        order.shuffle(rng);
        Self::new(order, rng.gen_range(0..widths.max(1)))
    }

    /// Order crossover (OX): keeps a slice of `self` in place and fills the
    /// rest in the order the genes appear in `other`, starting after the slice.
    pub fn order_crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> Self {
        let width_idx = if rng.gen_bool(0.5) {
            self.width_idx
        } else {
            other.width_idx
        };
        let n = self.order.len();
        if n < 2 {
            return Self::new(self.order.clone(), width_idx);
        }

        let (mut p1, mut p2) = (rng.gen_range(0..n), rng.gen_range(0..n));
        if p1 > p2 {
            std::mem::swap(&mut p1, &mut p2);
        }

        let mut child = vec![usize::MAX; n];
        let mut used = vec![false; n];
        for i in p1..=p2 {
            child[i] = self.order[i];
            used[self.order[i]] = true;
        }

        let mut j = (p2 + 1) % n;
        for k in 0..n {
            let idx = (p2 + 1 + k) % n;
            if child[idx] == usize::MAX {
                while used[other.order[j]] {
                    j = (j + 1) % n;
                }
                child[idx] = other.order[j];
                used[other.order[j]] = true;
                j = (j + 1) % n;
            }
        }

        Self::new(child, width_idx)
    }

    pub fn swap_mutate<R: Rng>(&mut self, rng: &mut R) {
        let n = self.order.len();
        if n < 2 {
            return;
        }
        let i = rng.gen_range(0..n);
        let j = rng.gen_range(0..n);
        self.order.swap(i, j);
        self.fitness = i64::MAX;
    }

    /// Reverses a random slice of the order.
    pub fn inversion_mutate<R: Rng>(&mut self, rng: &mut R) {
        let n = self.order.len();
        if n < 2 {
            return;
        }
        let (mut p1, mut p2) = (rng.gen_range(0..n), rng.gen_range(0..n));
        if p1 > p2 {
            std::mem::swap(&mut p1, &mut p2);
        }
        self.order[p1..=p2].reverse();
        self.fitness = i64::MAX;
    }

    /// Steps the trial width to a neighbouring candidate.
    pub fn width_mutate<R: Rng>(&mut self, widths: usize, rng: &mut R) {
        if widths < 2 {
            return;
        }
        self.width_idx = if self.width_idx == 0 {
            1
        } else if self.width_idx + 1 >= widths || rng.gen_bool(0.5) {
            self.width_idx - 1
        } else {
            self.width_idx + 1
        };
        self.fitness = i64::MAX;
    }

    /// 50% swap, 30% inversion, 20% width step.
    pub fn mutate<R: Rng>(&mut self, widths: usize, rng: &mut R) {
        let roll: f64 = rng.r#gen();
        if roll < 0.5 {
            self.swap_mutate(rng);
        } else if roll < 0.8 {
            self.inversion_mutate(rng);
        } else {
            self.width_mutate(widths, rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn is_permutation(order: &[usize]) -> bool {
        let mut sorted = order.to_vec();
        sorted.sort();
        sorted == (0..order.len()).collect::<Vec<_>>()
    }

    #[test]
    fn crossover_yields_valid_permutations() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let a = Chromosome::random(12, 4, &mut rng);
            let b = Chromosome::random(12, 4, &mut rng);
            let child = a.order_crossover(&b, &mut rng);
            assert!(is_permutation(&child.order));
            assert!(child.width_idx == a.width_idx || child.width_idx == b.width_idx);
            assert_eq!(child.fitness, i64::MAX);
        }
    }

    #[test]
    fn mutations_keep_permutation_and_width_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut c = Chromosome::random(9, 5, &mut rng);
        for _ in 0..200 {
            c.mutate(5, &mut rng);
            assert!(is_permutation(&c.order));
            assert!(c.width_idx < 5);
        }
    }

    #[test]
    fn tiny_chromosomes_are_left_alone() {
        let mut rng = StdRng::seed_from_u64(3);
        let a = Chromosome::new(vec![0], 0);
        let child = a.order_crossover(&a, &mut rng);
        assert_eq!(child.order, vec![0]);
        let mut c = Chromosome::new(vec![0], 0);
        c.width_mutate(1, &mut rng);
        assert_eq!(c.width_idx, 0);
    }
}
