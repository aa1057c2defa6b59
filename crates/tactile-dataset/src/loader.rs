//! Fixed-size batch loader

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::{Dataset, DatasetConfig, DatasetError, Sample};

/// Samples decoded for one step of the evaluation loop
#[derive(Debug, Clone, Default)]
pub struct Batch {
    pub samples: Vec<Sample>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Ordered producer of batches for a single evaluation pass
pub trait BatchSource {
    /// Number of batches a full pass yields
    fn batch_count(&self) -> usize;

    /// Next batch, or `None` once the pass is complete
    fn next_batch(&mut self) -> Result<Option<Batch>, DatasetError>;
}

/// Batches a [`Dataset`] in (optionally shuffled) index order
pub struct BatchLoader<D: Dataset> {
    dataset: D,
    order: Vec<usize>,
    cursor: usize,
    batch_size: usize,
    drop_last: bool,
}

impl<D: Dataset> BatchLoader<D> {
    pub fn new(dataset: D, config: &DatasetConfig) -> Result<Self, DatasetError> {
        if config.batch_size == 0 {
            return Err(DatasetError::InvalidBatchSize);
        }

        let mut order: Vec<usize> = (0..dataset.len()).collect();
        if config.shuffle {
            let mut rng = match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_rng(&mut rand::rng()),
            };
            order.shuffle(&mut rng);
        }

        info!(
            "Creating batch loader: samples={}, batch_size={}, shuffle={}, drop_last={}",
            order.len(),
            config.batch_size,
            config.shuffle,
            config.drop_last
        );

        Ok(Self {
            dataset,
            order,
            cursor: 0,
            batch_size: config.batch_size,
            drop_last: config.drop_last,
        })
    }

    /// Dataset being batched
    pub fn dataset(&self) -> &D {
        &self.dataset
    }
}

impl<D: Dataset> BatchSource for BatchLoader<D> {
    fn batch_count(&self) -> usize {
        let n = self.order.len();
        if self.drop_last {
            n / self.batch_size
        } else {
            n.div_ceil(self.batch_size)
        }
    }

    fn next_batch(&mut self) -> Result<Option<Batch>, DatasetError> {
        let remaining = self.order.len() - self.cursor;
        if remaining == 0 || (self.drop_last && remaining < self.batch_size) {
            if remaining > 0 {
                debug!("Dropping final partial batch of {} samples", remaining);
            }
            self.cursor = self.order.len();
            return Ok(None);
        }

        let end = self.cursor + remaining.min(self.batch_size);
        let samples = self.order[self.cursor..end]
            .iter()
            .map(|&index| self.dataset.get(index))
            .collect::<Result<Vec<_>, _>>()?;
        self.cursor = end;

        Ok(Some(Batch { samples }))
    }
}
