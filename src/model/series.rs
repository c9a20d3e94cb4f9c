//! Series storage
//!
//! [`Schema`] is the ordered set of series names fixed by the first sample.
//! [`SeriesSet`] holds the shared time axis and one value buffer per schema
//! entry; every push appends to all of them so that index `i` of the time
//! axis always lines up with index `i` of each series.

use std::borrow::Cow;

use super::sample::Sample;

/// Ordered set of series names established by the first sample of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    names: Vec<String>,
}

/// Key-set mismatch between a sample and the [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Drift {
    /// Schema names the sample did not supply
    pub missing: Vec<String>,
    /// Sample names the schema does not know
    pub unexpected: Vec<String>,
}

impl Schema {
    pub fn from_sample(sample: &Sample) -> Self {
        Self {
            names: sample.names().map(str::to_string).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Values of `sample` in schema order, or the drift if the key sets differ.
    pub fn project(&self, sample: &Sample) -> Result<Vec<f64>, Drift> {
        let mut drift = Drift::default();
        let mut values = Vec::with_capacity(self.names.len());

        for name in &self.names {
            match sample.get(name) {
                Some(value) => values.push(value),
                None => drift.missing.push(name.clone()),
            }
        }
        drift.unexpected = sample
            .names()
            .filter(|name| !self.names.iter().any(|known| known == name))
            .map(str::to_string)
            .collect();

        if drift.missing.is_empty() && drift.unexpected.is_empty() {
            Ok(values)
        } else {
            Err(drift)
        }
    }
}

/// Time axis plus one value buffer per series.
#[derive(Debug, Clone)]
pub struct SeriesSet {
    schema: Schema,
    times: Vec<f64>,
    values: Vec<Vec<f64>>,
}

impl SeriesSet {
    /// Create the set from the first sample; the time axis starts at `0`.
    pub fn seed(sample: &Sample) -> Self {
        let schema = Schema::from_sample(sample);
        let values = sample
            .entries()
            .iter()
            .map(|(_, value)| vec![*value])
            .collect();
        Self {
            schema,
            times: vec![0.0],
            values,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Number of accepted samples, the seed included.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Append one sample at `time`.
    ///
    /// Nothing is appended when the sample's keys disagree with the schema.
    pub fn push(&mut self, time: f64, sample: &Sample) -> Result<(), Drift> {
        let projected = self.schema.project(sample)?;
        self.times.push(time);
        for (buffer, value) in self.values.iter_mut().zip(projected) {
            buffer.push(value);
        }
        Ok(())
    }

    /// `(name, values)` for every series in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.schema
            .names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Vec::as_slice))
    }

    pub fn values(&self, name: &str) -> Option<&[f64]> {
        self.iter()
            .find(|(series, _)| *series == name)
            .map(|(_, values)| values)
    }
}

/// Scale `values` by their maximum absolute value.
///
/// A buffer whose maximum is `0` is divided by `1`, i.e. returned as is.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let max = values.iter().fold(0.0_f64, |max, value| max.max(value.abs()));
    let divisor = if max == 0.0 { 1.0 } else { max };
    values.iter().map(|value| value / divisor).collect()
}

/// Borrow `values` untouched, or normalize them into a new buffer.
pub fn display_values(values: &[f64], normalized: bool) -> Cow<'_, [f64]> {
    if normalized {
        Cow::Owned(normalize(values))
    } else {
        Cow::Borrowed(values)
    }
}
