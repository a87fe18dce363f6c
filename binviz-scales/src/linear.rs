/// Linear map from a data domain to a range of logical units
#[derive(Clone, Debug, PartialEq)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
    clamp: bool,
}

impl Default for LinearScale {
    fn default() -> Self {
        Self::new((0.0, 1.0), (0.0, 1.0))
    }
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            domain_start: domain.0,
            domain_end: domain.1,
            range_start: range.0,
            range_end: range.1,
            clamp: false,
        }
    }

    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    pub fn range(&self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    fn is_degenerate(&self) -> bool {
        self.domain_start == self.domain_end
            || !self.domain_start.is_finite()
            || !self.domain_end.is_finite()
            || !self.range_start.is_finite()
            || !self.range_end.is_finite()
    }

    /// Maps a domain value to the range
    pub fn scale(&self, value: f64) -> f64 {
        // Handle degenerate domain/range cases
        if self.is_degenerate() || !value.is_finite() {
            return self.range_start;
        }
        let scale = (self.range_end - self.range_start) / (self.domain_end - self.domain_start);
        let mapped = self.range_start + scale * (value - self.domain_start);
        if self.clamp {
            let (lo, hi) = if self.range_start <= self.range_end {
                (self.range_start, self.range_end)
            } else {
                (self.range_end, self.range_start)
            };
            mapped.clamp(lo, hi)
        } else {
            mapped
        }
    }

    /// Maps a range value back to the domain
    pub fn invert(&self, value: f64) -> f64 {
        if self.is_degenerate() || self.range_start == self.range_end || !value.is_finite() {
            return self.domain_start;
        }
        let scale = (self.domain_end - self.domain_start) / (self.range_end - self.range_start);
        self.domain_start + scale * (value - self.range_start)
    }
}
