//! Per-round population statistics.
//!
//! Two views of the population are tracked each round:
//! - **Entropy**: how uncertain individual nodes are (mean, spread, extremes)
//! - **Fragmentation**: which share of the population holds each opinion

use crate::rumor::{Rumor, RUMOR_SPACE};
use serde::{Deserialize, Serialize};

/// Summary of the per-node entropy vector for one round.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EntropySummary {
    pub mean: f64,
    /// Population variance
    pub variance: f64,
    pub max: f64,
    pub min: f64,
}

impl EntropySummary {
    /// Summarizes a set of per-node entropies (all zero for an empty slice).
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|h| (h - mean).powi(2)).sum::<f64>() / n;
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);

        Self {
            mean,
            variance,
            max,
            min,
        }
    }

    /// Standard deviation.
    pub fn std_dev(&self) -> f64 {
        self.variance.sqrt()
    }

    fn add_scaled(&mut self, other: &EntropySummary, weight: f64) {
        self.mean += other.mean * weight;
        self.variance += other.variance * weight;
        self.max += other.max * weight;
        self.min += other.min * weight;
    }
}

/// Share of the whole population holding each rumor as its opinion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpinionHistogram {
    shares: Vec<f64>,
}

impl Default for OpinionHistogram {
    fn default() -> Self {
        Self {
            shares: vec![0.0; RUMOR_SPACE],
        }
    }
}

impl OpinionHistogram {
    /// Builds the histogram from each informed node's opinion.
    ///
    /// `population` counts every node, informed or not, so the shares of an
    /// only partly informed population sum to less than one.
    pub fn from_opinions<I>(opinions: I, population: usize) -> Self
    where
        I: IntoIterator<Item = Rumor>,
    {
        let mut hist = Self::default();
        if population == 0 {
            return hist;
        }

        let unit = 1.0 / population as f64;
        for opinion in opinions {
            hist.shares[opinion.index()] += unit;
        }
        hist
    }

    /// Share of nodes whose opinion is `rumor`.
    pub fn share(&self, rumor: Rumor) -> f64 {
        self.shares[rumor.index()]
    }

    /// Shares indexed by rumor value.
    pub fn shares(&self) -> &[f64] {
        &self.shares
    }

    /// Share of nodes holding any opinion.
    pub fn informed(&self) -> f64 {
        self.shares.iter().sum()
    }

    /// Most widely held opinion and its share (lowest rumor wins ties).
    pub fn dominant(&self) -> Option<(Rumor, f64)> {
        Rumor::all()
            .map(|r| (r, self.share(r)))
            .filter(|&(_, s)| s > 0.0)
            .fold(None, |best, (r, s)| match best {
                Some((_, bs)) if bs >= s => best,
                _ => Some((r, s)),
            })
    }

    fn add_scaled(&mut self, other: &OpinionHistogram, weight: f64) {
        for (mine, theirs) in self.shares.iter_mut().zip(&other.shares) {
            *mine += theirs * weight;
        }
    }
}

/// Statistics of one spreading run, one entry per round.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunStatistics {
    pub entropy: Vec<EntropySummary>,
    pub opinions: Vec<OpinionHistogram>,
}

impl RunStatistics {
    /// Creates an empty series with room for `rounds` entries.
    pub fn with_rounds(rounds: usize) -> Self {
        Self {
            entropy: Vec::with_capacity(rounds),
            opinions: Vec::with_capacity(rounds),
        }
    }

    /// All-zero series of `rounds` entries, the starting point for averaging.
    pub fn zeroed(rounds: usize) -> Self {
        Self {
            entropy: vec![EntropySummary::default(); rounds],
            opinions: vec![OpinionHistogram::default(); rounds],
        }
    }

    /// Appends one round.
    pub fn record(&mut self, entropy: EntropySummary, opinions: OpinionHistogram) {
        self.entropy.push(entropy);
        self.opinions.push(opinions);
    }

    /// Number of recorded rounds.
    pub fn rounds(&self) -> usize {
        self.entropy.len()
    }

    /// Adds `weight * other` round by round (weight `1/trials` averages).
    ///
    /// Rounds missing from `other` contribute nothing.
    pub fn accumulate(&mut self, other: &RunStatistics, weight: f64) {
        for (mine, theirs) in self.entropy.iter_mut().zip(&other.entropy) {
            mine.add_scaled(theirs, weight);
        }
        for (mine, theirs) in self.opinions.iter_mut().zip(&other.opinions) {
            mine.add_scaled(theirs, weight);
        }
    }

    /// Summary of the last round.
    pub fn final_entropy(&self) -> Option<&EntropySummary> {
        self.entropy.last()
    }

    /// Opinion histogram of the last round.
    pub fn final_opinions(&self) -> Option<&OpinionHistogram> {
        self.opinions.last()
    }

    /// Fragmentation matrix: row per rumor, column per round.
    pub fn fragmentation_matrix(&self) -> Vec<Vec<f64>> {
        Rumor::all()
            .map(|r| self.opinions.iter().map(|h| h.share(r)).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn r(s: &str) -> Rumor {
        s.parse().unwrap()
    }

    #[test]
    fn test_entropy_summary() {
        let s = EntropySummary::from_values(&[0.0, 1.0, 2.0, 1.0]);
        assert_relative_eq!(s.mean, 1.0);
        assert_relative_eq!(s.variance, 0.5);
        assert_relative_eq!(s.max, 2.0);
        assert_relative_eq!(s.min, 0.0);
        assert_relative_eq!(s.std_dev(), 0.5_f64.sqrt());

        assert_eq!(EntropySummary::from_values(&[]), EntropySummary::default());
    }

    #[test]
    fn test_histogram_counts_whole_population() {
        let hist = OpinionHistogram::from_opinions(
            vec![Rumor::TRUE, Rumor::TRUE, r("00100")],
            6,
        );

        assert_relative_eq!(hist.share(Rumor::TRUE), 2.0 / 6.0);
        assert_relative_eq!(hist.share(r("00100")), 1.0 / 6.0);
        assert_relative_eq!(hist.informed(), 0.5);
        assert_eq!(hist.dominant(), Some((Rumor::TRUE, 2.0 / 6.0)));
    }

    #[test]
    fn test_histogram_empty() {
        let hist = OpinionHistogram::from_opinions(Vec::new(), 10);
        assert_eq!(hist.dominant(), None);
        assert_eq!(hist.informed(), 0.0);

        let nobody = OpinionHistogram::from_opinions(vec![Rumor::FALSE], 0);
        assert_eq!(nobody.informed(), 0.0);
    }

    #[test]
    fn test_accumulate_averages_trials() {
        let mut a = RunStatistics::with_rounds(1);
        a.record(
            EntropySummary::from_values(&[1.0, 3.0]),
            OpinionHistogram::from_opinions(vec![Rumor::TRUE], 2),
        );

        let mut b = RunStatistics::with_rounds(1);
        b.record(
            EntropySummary::from_values(&[3.0, 5.0]),
            OpinionHistogram::from_opinions(vec![Rumor::FALSE, Rumor::FALSE], 2),
        );

        let mut avg = RunStatistics::zeroed(1);
        avg.accumulate(&a, 0.5);
        avg.accumulate(&b, 0.5);

        let e = avg.final_entropy().unwrap();
        assert_relative_eq!(e.mean, 3.0);
        assert_relative_eq!(e.max, 4.0);
        assert_relative_eq!(e.min, 2.0);

        let o = avg.final_opinions().unwrap();
        assert_relative_eq!(o.share(Rumor::TRUE), 0.25);
        assert_relative_eq!(o.share(Rumor::FALSE), 0.5);
    }

    #[test]
    fn test_fragmentation_matrix_layout() {
        let mut stats = RunStatistics::with_rounds(2);
        stats.record(
            EntropySummary::default(),
            OpinionHistogram::from_opinions(vec![Rumor::TRUE], 4),
        );
        stats.record(
            EntropySummary::default(),
            OpinionHistogram::from_opinions(vec![Rumor::TRUE, r("00001")], 4),
        );

        let m = stats.fragmentation_matrix();
        assert_eq!(m.len(), RUMOR_SPACE);
        assert_eq!(m[0], vec![0.25, 0.25]);
        assert_eq!(m[1], vec![0.0, 0.25]);
    }
}
