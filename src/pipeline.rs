//! Pipeline driver: Fetch -> Denoise -> Cluster -> Build for one identity.
//!
//! Each `run` is an independent, request-scoped traversal of the four
//! stages; no state persists across invocations beyond what the injected
//! repository already holds. Independent identities can therefore be
//! processed in parallel, which `run_batch` does under the `parallel`
//! feature.

use log::{debug, info};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::binning::remove_noise;
use crate::clustering::cluster;
use crate::error::Result;
use crate::repository::PointRepository;
use crate::tour_model::{build_tour_model, TourModel};
use crate::PipelineConfig;

/// End-to-end tour-model pipeline over an injected point repository.
pub struct TourPipeline<R: PointRepository> {
    repository: R,
    config: PipelineConfig,
}

impl<R: PointRepository> TourPipeline<R> {
    /// Create a pipeline with the default configuration.
    pub fn new(repository: R) -> Self {
        Self::with_config(repository, PipelineConfig::default())
    }

    /// Create a pipeline with a custom configuration.
    pub fn with_config(repository: R, config: PipelineConfig) -> Self {
        Self { repository, config }
    }

    /// The active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Access the injected repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Derive the tour model for one identity.
    ///
    /// `use_old_data` selects the legacy record set. Identities without
    /// stored points produce an empty model; `Err` is reserved for store
    /// failures. Repeated runs over an unchanged snapshot reproduce the
    /// same cluster count and label partition.
    pub fn run(&self, identity: &str, use_old_data: bool) -> Result<TourModel> {
        let points = self.repository.fetch_points(identity, use_old_data)?;
        debug!("identity '{}': fetched {} points", identity, points.len());

        let (filtered, bins) = remove_noise(&points, self.config.radius_meters, self.config.min_bin_size);
        let outcome = cluster(&filtered, bins.len(), self.config.include_noise, &self.config);
        let model = build_tour_model(&outcome);

        info!(
            "identity '{}': {} points, {} bins, {} clusters, {} places",
            identity,
            points.len(),
            bins.len(),
            outcome.cluster_count,
            model.len()
        );

        Ok(model)
    }

    /// Derive tour models for a batch of identities.
    ///
    /// Per-identity empty models are normal results for sparse users; the
    /// first store failure aborts the batch.
    #[cfg(feature = "parallel")]
    pub fn run_batch(
        &self,
        identities: &[String],
        use_old_data: bool,
    ) -> Result<Vec<(String, TourModel)>>
    where
        R: Sync,
    {
        identities
            .par_iter()
            .map(|identity| Ok((identity.clone(), self.run(identity, use_old_data)?)))
            .collect()
    }

    /// Derive tour models for a batch of identities, sequentially.
    #[cfg(not(feature = "parallel"))]
    pub fn run_batch(
        &self,
        identities: &[String],
        use_old_data: bool,
    ) -> Result<Vec<(String, TourModel)>> {
        identities
            .iter()
            .map(|identity| Ok((identity.clone(), self.run(identity, use_old_data)?)))
            .collect()
    }
}
