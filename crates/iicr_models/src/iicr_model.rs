pub trait IicrModel {
    /// The IICR at time `t` (in units of 2N0 generations), `None` where the
    /// ratio is not finite.
    fn iicr_at(&self, t: f64) -> Option<f64>;

    fn iicr(&self, times: &[f64]) -> Vec<Option<f64>> {
        times.iter().map(|&t| self.iicr_at(t)).collect()
    }
}
