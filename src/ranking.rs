use crate::measurement::{Measurement, SiteRole};

/// Sorts by duration (stable) and assigns dense ranks starting at 1.
pub fn rank(mut measurements: Vec<Measurement>) -> Vec<Measurement> {
    measurements.sort_by_key(|m| m.duration());
    for (index, measurement) in measurements.iter_mut().enumerate() {
        measurement.set_rank(index + 1);
    }
    measurements
}

/// The ranked outcome of one run: every site ordered fastest first, benchmark included.
#[derive(Debug, Clone)]
pub struct RankedSet {
    sites: Vec<Measurement>,
    benchmark: usize,
}

impl RankedSet {
    /// Ranks the benchmark together with its competitors.
    ///
    /// Roles are assigned here: `benchmark` is tagged as the benchmark and every entry of
    /// `competitors` as a competitor, whatever they carried before. The benchmark goes into
    /// the sort after the competitors, so on an exact tie the competitor keeps the better place.
    pub fn from_run(mut benchmark: Measurement, competitors: Vec<Measurement>) -> Self {
        benchmark.set_role(SiteRole::Benchmark);
        // Stable sort with the benchmark last: it lands right after every competitor
        // that is not slower.
        let position = competitors
            .iter()
            .filter(|c| c.duration() <= benchmark.duration())
            .count();

        let mut all = competitors;
        for competitor in &mut all {
            competitor.set_role(SiteRole::Competitor);
        }
        all.push(benchmark);
        let sites = rank(all);
        debug_assert!(sites[position].is_benchmark());

        Self { sites, benchmark: position }
    }

    pub fn benchmark(&self) -> &Measurement {
        &self.sites[self.benchmark]
    }

    /// Benchmark's 1-based place.
    pub fn benchmark_rank(&self) -> usize {
        self.benchmark + 1
    }

    pub fn competitors(&self) -> impl Iterator<Item = &Measurement> {
        let benchmark = self.benchmark;
        self.sites
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != benchmark)
            .map(|(_, m)| m)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Measurement> {
        self.sites.iter()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

}

impl<'a> IntoIterator for &'a RankedSet {
    type Item = &'a Measurement;
    type IntoIter = std::slice::Iter<'a, Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.sites.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn site(url: &str, millis: u64, base: Instant) -> Measurement {
        Measurement::new(url, base, base + Duration::from_millis(millis))
    }

    #[test]
    fn test_empty_input() {
        assert!(rank(Vec::new()).is_empty());
    }

    #[test]
    fn test_single_element_gets_rank_one() {
        let base = Instant::now();
        let ranked = rank(vec![site("a", 10, base)]);
        assert_eq!(ranked[0].rank(), Some(1));
    }

    #[test]
    fn test_sorted_ascending_with_dense_ranks() {
        let base = Instant::now();
        let ranked = rank(vec![site("slow", 300, base), site("fast", 100, base), site("mid", 200, base)]);
        let urls: Vec<_> = ranked.iter().map(|m| m.url()).collect();
        let ranks: Vec<_> = ranked.iter().map(|m| m.rank().unwrap()).collect();
        assert_eq!(urls, ["fast", "mid", "slow"]);
        assert_eq!(ranks, [1, 2, 3]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let base = Instant::now();
        let ranked = rank(vec![
            site("first", 100, base),
            site("second", 50, base),
            site("third", 100, base),
            site("fourth", 100, base),
        ]);
        let urls: Vec<_> = ranked.iter().map(|m| m.url()).collect();
        assert_eq!(urls, ["second", "first", "third", "fourth"]);
    }

    #[test]
    fn test_ranking_twice_is_idempotent() {
        let base = Instant::now();
        let once = rank(vec![site("b", 20, base), site("a", 10, base), site("c", 20, base)]);
        let snapshot: Vec<_> = once.iter().map(|m| (m.url().to_string(), m.rank())).collect();
        let twice = rank(once);
        let again: Vec<_> = twice.iter().map(|m| (m.url().to_string(), m.rank())).collect();
        assert_eq!(snapshot, again);
    }

    #[test]
    fn test_from_run_tracks_benchmark() {
        let base = Instant::now();
        let benchmark = Measurement::benchmark("mine", base, base + Duration::from_millis(150));
        let set = RankedSet::from_run(benchmark, vec![site("a", 100, base), site("b", 200, base)]);

        assert_eq!(set.len(), 3);
        assert_eq!(set.benchmark().url(), "mine");
        assert_eq!(set.benchmark_rank(), 2);
        assert_eq!(set.benchmark().rank(), Some(2));
        let competitors: Vec<_> = set.competitors().map(|m| m.url()).collect();
        assert_eq!(competitors, ["a", "b"]);
    }

    #[test]
    fn test_benchmark_loses_exact_ties() {
        let base = Instant::now();
        let benchmark = Measurement::benchmark("mine", base, base + Duration::from_millis(100));
        let set = RankedSet::from_run(benchmark, vec![site("rival", 100, base)]);
        assert_eq!(set.benchmark_rank(), 2);
    }

    #[test]
    fn test_from_run_retags_roles() {
        let base = Instant::now();
        // Benchmark built without its role, plus a competitor wrongly tagged as benchmark.
        let mine = site("mine", 100, base);
        let impostor = Measurement::benchmark("impostor", base, base + Duration::from_millis(900));
        let set = RankedSet::from_run(mine, vec![site("a", 500, base), impostor]);

        assert_eq!(set.benchmark().url(), "mine");
        assert!(set.benchmark().is_benchmark());
        assert_eq!(set.benchmark_rank(), 1);
        assert_eq!(set.iter().filter(|m| m.is_benchmark()).count(), 1);
        let competitors: Vec<_> = set.competitors().map(|m| m.url()).collect();
        assert_eq!(competitors, ["a", "impostor"]);
    }

    #[test]
    fn test_benchmark_alone() {
        let base = Instant::now();
        let set = RankedSet::from_run(Measurement::benchmark("mine", base, base), Vec::new());
        assert_eq!(set.benchmark_rank(), 1);
        assert_eq!(set.competitors().count(), 0);
    }

    #[test]
    fn test_benchmark_position_with_ties_on_both_sides() {
        let base = Instant::now();
        let benchmark = Measurement::benchmark("mine", base, base + Duration::from_millis(200));
        let set = RankedSet::from_run(
            benchmark,
            vec![
                site("slow", 300, base),
                site("tie", 200, base),
                site("fast", 100, base),
            ],
        );
        let urls: Vec<_> = set.iter().map(|m| m.url()).collect();
        assert_eq!(urls, ["fast", "tie", "mine", "slow"]);
        assert_eq!(set.benchmark_rank(), 3);
    }
}
