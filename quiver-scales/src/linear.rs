#[derive(Clone, Debug)]
pub struct LinearNumericScaleConfig {
    pub domain: (f32, f32),
    pub range: (f32, f32),
    pub clamp: bool,
    pub round: bool,
}

impl Default for LinearNumericScaleConfig {
    fn default() -> Self {
        Self {
            domain: (0.0, 1.0),
            range: (0.0, 1.0),
            clamp: false,
            round: false,
        }
    }
}

/// A linear scale that maps numeric input values from a domain to a range.
#[derive(Clone, Debug)]
pub struct LinearNumericScale {
    domain_start: f32,
    domain_end: f32,
    range_start: f32,
    range_end: f32,
    clamp: bool,
    round: bool,
}

impl LinearNumericScale {
    pub fn new(config: &LinearNumericScaleConfig) -> Self {
        Self {
            domain_start: config.domain.0,
            domain_end: config.domain.1,
            range_start: config.range.0,
            range_end: config.range.1,
            clamp: config.clamp,
            round: config.round,
        }
    }

    pub fn with_domain(mut self, domain: (f32, f32)) -> Self {
        self.set_domain(domain);
        self
    }

    pub fn with_range(mut self, range: (f32, f32)) -> Self {
        self.set_range(range);
        self
    }

    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    pub fn with_round(mut self, round: bool) -> Self {
        self.round = round;
        self
    }

    pub fn domain(&self) -> (f32, f32) {
        (self.domain_start, self.domain_end)
    }

    pub fn range(&self) -> (f32, f32) {
        (self.range_start, self.range_end)
    }

    pub fn clamp(&self) -> bool {
        self.clamp
    }

    pub fn set_domain(&mut self, domain: (f32, f32)) {
        self.domain_start = domain.0;
        self.domain_end = domain.1;
    }

    pub fn set_range(&mut self, range: (f32, f32)) {
        self.range_start = range.0;
        self.range_end = range.1;
    }

    fn is_degenerate(&self) -> bool {
        self.domain_start == self.domain_end
            || self.range_start == self.range_end
            || self.domain_start.is_nan()
            || self.domain_end.is_nan()
            || self.range_start.is_nan()
            || self.range_end.is_nan()
    }

    fn range_bounds(&self) -> (f32, f32) {
        if self.range_start <= self.range_end {
            (self.range_start, self.range_end)
        } else {
            (self.range_end, self.range_start)
        }
    }

    /// Maps a domain value to the range
    pub fn scale(&self, value: f32) -> f32 {
        // Degenerate domain or range maps everything to the range start (d3 behavior)
        if self.is_degenerate() {
            return self.range_start;
        }

        let scale = (self.range_end - self.range_start) / (self.domain_end - self.domain_start);
        let offset = self.range_start - scale * self.domain_start;
        let mut v = scale * value + offset;

        if self.clamp {
            let (range_min, range_max) = self.range_bounds();
            v = v.clamp(range_min, range_max);
        }
        if self.round {
            v = v.round();
        }
        v
    }

    pub fn scale_slice(&self, values: &[f32]) -> Vec<f32> {
        values.iter().map(|v| self.scale(*v)).collect()
    }

    /// Maps a range value back to the domain
    pub fn invert(&self, value: f32) -> f32 {
        if self.is_degenerate() {
            return self.domain_start;
        }

        let scale = (self.domain_end - self.domain_start) / (self.range_end - self.range_start);
        let offset = self.domain_start - scale * self.range_start;

        let value = if self.clamp {
            let (range_min, range_max) = self.range_bounds();
            value.clamp(range_min, range_max)
        } else {
            value
        };
        scale * value + offset
    }
}
