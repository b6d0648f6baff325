use std::collections::VecDeque;

/// Mean over the last `window` samples.
#[derive(Debug, Clone)]
pub struct RunningAverage {
    window: usize,
    values: VecDeque<f32>,
    sum: f64,
}

impl RunningAverage {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            values: VecDeque::with_capacity(window),
            sum: 0.0,
        }
    }

    pub fn feed(&mut self, value: f32) {
        self.values.push_back(value);
        self.sum += value as f64;
        while self.values.len() > self.window {
            if let Some(old) = self.values.pop_front() {
                self.sum -= old as f64;
            }
        }
    }

    /// 0 until the first sample arrives.
    pub fn average(&self) -> f32 {
        if self.values.is_empty() {
            0.0
        } else {
            (self.sum / self.values.len() as f64) as f32
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Named running averages, reported in registration order.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    series: Vec<(String, RunningAverage)>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a series. Re-registering a name resets it.
    pub fn track(&mut self, name: &str, window: usize) {
        match self.series.iter_mut().find(|(n, _)| n == name) {
            Some((_, avg)) => *avg = RunningAverage::new(window),
            None => self.series.push((name.to_string(), RunningAverage::new(window))),
        }
    }

    /// Samples for unknown names are dropped.
    pub fn put(&mut self, name: &str, value: f32) {
        if let Some((_, avg)) = self.series.iter_mut().find(|(n, _)| n == name) {
            avg.feed(value);
        }
    }

    pub fn mean(&self, name: &str) -> Option<f32> {
        self.series
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, avg)| avg.average())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.series.iter().map(|(n, avg)| (n.as_str(), avg.average()))
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
