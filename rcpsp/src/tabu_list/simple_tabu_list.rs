use rand::seq::SliceRandom;
use rand::Rng;

use super::TabuList;

/// Share of recorded moves dropped by [`TabuList::prune`].
const PRUNE_RATIO: f32 = 0.3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleTabuList {
    /// Current index at tabu list. (circular buffer)
    cur_idx: usize,
    /// Array of tabu list items, `None` for free slots.
    tabu: Vec<Option<(usize, usize)>>,
    /// Tabu lookup, a `number_of_activities x number_of_activities` matrix.
    tabu_search: Vec<Vec<bool>>,
}

impl SimpleTabuList {
    pub fn new(number_of_activities: usize, length: usize) -> Self {
        Self {
            cur_idx: 0,
            tabu: vec![None; length],
            tabu_search: vec![vec![false; number_of_activities]; number_of_activities],
        }
    }

    pub fn len(&self) -> usize {
        self.tabu.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn set(&mut self, (i, j): (usize, usize), value: bool) {
        if let Some(ts) = self.tabu_search.get_mut(i).and_then(|tsv| tsv.get_mut(j)) {
            *ts = value;
        }
    }
}

fn normalized(i: usize, j: usize) -> (usize, usize) {
    (i.min(j), i.max(j))
}

impl TabuList for SimpleTabuList {
    fn is_possible_move(&self, i: usize, j: usize) -> bool {
        let (i, j) = normalized(i, j);
        !self
            .tabu_search
            .get(i)
            .and_then(|tsv| tsv.get(j))
            .copied()
            .unwrap_or(false)
    }

    fn add_turn_to_tabu_list(&mut self, i: usize, j: usize) {
        if self.tabu.is_empty() {
            return;
        }

        if let Some(expired) = self.tabu[self.cur_idx].take() {
            self.set(expired, false);
        }

        let record = normalized(i, j);
        self.tabu[self.cur_idx] = Some(record);
        self.set(record, true);

        self.cur_idx = (self.cur_idx + 1) % self.tabu.len();
    }

    fn prune<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut idx_valid_moves: Vec<usize> = self
            .tabu
            .iter()
            .enumerate()
            .filter_map(|(idx, record)| record.map(|_| idx))
            .collect();

        idx_valid_moves.shuffle(rng);

        let count_moves_to_remove = (PRUNE_RATIO * idx_valid_moves.len() as f32).ceil() as usize;

        for &move_idx in idx_valid_moves.iter().take(count_moves_to_remove) {
            if let Some(record) = self.tabu[move_idx].take() {
                self.set(record, false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn moves_expire_in_fifo_order() {
        let mut tabu_list = SimpleTabuList::new(5, 2);

        tabu_list.add_turn_to_tabu_list(1, 2);
        tabu_list.add_turn_to_tabu_list(4, 3);
        assert!(!tabu_list.is_possible_move(2, 1));
        assert!(!tabu_list.is_possible_move(3, 4));
        assert!(tabu_list.is_possible_move(1, 3));

        tabu_list.add_turn_to_tabu_list(0, 1);
        assert!(tabu_list.is_possible_move(1, 2));
        assert!(!tabu_list.is_possible_move(0, 1));
        assert_eq!(tabu_list.len(), 2);
    }

    #[test]
    fn zero_length_list_forbids_nothing() {
        let mut tabu_list = SimpleTabuList::new(3, 0);
        tabu_list.add_turn_to_tabu_list(0, 1);

        assert!(tabu_list.is_possible_move(0, 1));
        assert!(tabu_list.is_empty());
    }

    #[test]
    fn prune_frees_some_moves() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut tabu_list = SimpleTabuList::new(10, 10);
        for i in 0..9 {
            tabu_list.add_turn_to_tabu_list(i, i + 1);
        }

        tabu_list.prune(&mut rng);

        assert_eq!(tabu_list.len(), 6);
        let freed = (0..9)
            .filter(|&i| tabu_list.is_possible_move(i, i + 1))
            .count();
        assert_eq!(freed, 3);
    }
}
