//! Gain-controlled windowed averaging of a measurement stream.

use tagtrack_core::Measurement;

/// Largest averaging window, reached at gain 0.
pub const MAX_FRAMES: usize = 100;

/// A fixed-capacity circular buffer: fills up, then overwrites the oldest
/// element.
#[derive(Clone, Debug)]
pub struct CircularBuffer<T> {
    data: Vec<T>,
    next: usize,
    capacity: usize,
}

impl<T> CircularBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "circular buffer capacity must be non-zero");
        Self {
            data: Vec::with_capacity(capacity),
            next: 0,
            capacity,
        }
    }

    pub fn push(&mut self, value: T) {
        if self.data.len() < self.capacity {
            self.data.push(value);
        } else {
            self.data[self.next] = value;
            self.next = (self.next + 1) % self.capacity;
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates over the buffered elements in storage order (the order is
    /// irrelevant to the mean and variance computed over them).
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }
}

/// Averages a measurement stream over a gain-controlled window.
///
/// `gain` trades responsiveness for smoothness. At `gain >= 1.0` the filter
/// is a pass-through: the estimate is exactly the last pushed sample. At
/// `gain = 0.0` the estimate is the uniform mean of up to [`MAX_FRAMES`]
/// recent samples. In between, the window length is
/// `MAX_FRAMES * (1 - gain) + 1`, interpolating continuously between the
/// two.
///
/// The estimate is recomputed lazily: pushes mark the state dirty and the
/// next [`estimate`](Self::estimate) call recomputes the mean once,
/// amortizing the cost over repeated reads.
#[derive(Clone, Debug)]
pub struct AveragingFilter<T> {
    gain: f64,
    window: usize,
    samples: CircularBuffer<T>,
    estimate: Option<T>,
    dirty: bool,
}

impl<T: Measurement> AveragingFilter<T> {
    /// Creates a filter with the given gain, expected in `[0, 1]`.
    pub fn new(gain: f64) -> Self {
        // f64-to-usize casts saturate, so gain > 1 degenerates to window 1.
        let window = (MAX_FRAMES as f64 * (1.0 - gain)) as usize + 1;
        Self {
            gain,
            window,
            samples: CircularBuffer::new(window),
            estimate: None,
            dirty: false,
        }
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// Configured window length (not the number of samples buffered so far).
    pub fn window(&self) -> usize {
        self.window
    }

    /// Adds an observed sample.
    pub fn push(&mut self, sample: T) {
        // Max gain: no filtering, the last measurement is the estimate.
        if self.gain >= 1.0 {
            self.estimate = Some(sample);
            self.dirty = false;
            return;
        }
        self.samples.push(sample);
        self.dirty = true;
    }

    /// Returns the current estimate, recomputing the buffered mean if new
    /// samples arrived since the last call.
    ///
    /// # Panics
    ///
    /// Panics if nothing has been pushed yet; feeding at least one sample
    /// first is a caller contract.
    pub fn estimate(&mut self) -> T {
        if self.dirty {
            self.estimate = Some(self.mean());
            self.dirty = false;
        }
        self.estimate
            .clone()
            .expect("AveragingFilter::estimate called before any push")
    }

    fn mean(&self) -> T {
        let mut samples = self.samples.iter();
        let mut sum = samples
            .next()
            .expect("AveragingFilter buffer is empty")
            .clone();
        let mut count = 1usize;
        for sample in samples {
            sum.accumulate(sample);
            count += 1;
        }
        sum.scaled(1.0 / count as f64)
    }

    /// Mean squared deviation of the buffered samples, normalized by the
    /// configured window length rather than the buffered sample count. While
    /// the buffer is still filling the value is therefore an underestimate.
    ///
    /// Only meaningful at `gain < 1.0`: the pass-through mode buffers
    /// nothing, so there is no sample spread to measure.
    ///
    /// # Panics
    ///
    /// Panics if nothing has been pushed yet (same contract as
    /// [`estimate`](Self::estimate)), or if the filter runs at `gain >= 1.0`.
    pub fn variance(&self) -> T {
        let mean = self.mean();
        let mut samples = self.samples.iter();
        let mut sum = samples
            .next()
            .expect("AveragingFilter buffer is empty")
            .squared_deviation(&mean);
        for sample in samples {
            sum.accumulate(&sample.squared_deviation(&mean));
        }
        sum.scaled(1.0 / self.window as f64)
    }
}
