use rand::Rng;

pub mod simple_tabu_list;

pub use simple_tabu_list::SimpleTabuList;

/// Short-term memory of recently applied swaps.
pub trait TabuList {
    /// Check if move is permitted
    fn is_possible_move(&self, i: usize, j: usize) -> bool;
    /// Add move (specified by i,j) to tabu list.
    fn add_turn_to_tabu_list(&mut self, i: usize, j: usize);
    /// The method removes some tabu moves randomly since all solutions in neighborhood were tabu.
    fn prune<R: Rng + ?Sized>(&mut self, rng: &mut R);
}
