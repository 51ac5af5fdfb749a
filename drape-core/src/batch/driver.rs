use rayon::prelude::*;

use crate::{
    assets::store::AssetLookup,
    batch::job::BatchJob,
    batch::mask_cache::MaskCache,
    encode::sink::OutputSink,
    engine::compose::{CompositionEngine, WrapStrategy},
    foundation::error::{DrapeError, DrapeResult},
    raster::buffer::RasterBuffer,
};

/// Batch execution settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    /// Fabric simulation applied to every job.
    pub strategy: WrapStrategy,
    /// Compose jobs on a rayon pool.
    pub parallel: bool,
    /// Jobs composed per parallel round before their outputs reach the sink.
    pub chunk_size: usize,
    /// Optional worker count (`None` lets rayon decide).
    pub threads: Option<usize>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            strategy: WrapStrategy::None,
            parallel: false,
            chunk_size: 64,
            threads: None,
        }
    }
}

/// A job that did not produce an output.
#[derive(Debug)]
pub struct BatchFailure {
    /// Position in the submitted job list.
    pub index: usize,
    /// The job as submitted.
    pub job: BatchJob,
    /// Why it failed.
    pub error: DrapeError,
}

/// Outcome of [`BatchDriver::run`]. Both lists are in job order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Output identifiers of successful jobs.
    pub successes: Vec<String>,
    /// Failed jobs with their errors.
    pub failures: Vec<BatchFailure>,
    /// Alpha masks derived during the run (one per distinct base id that loaded).
    pub masks_derived: usize,
    /// Set when the sink accepted the outputs but failed to finish.
    pub finish_error: Option<DrapeError>,
}

impl BatchReport {
    /// Jobs attempted.
    pub fn total(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// `true` when every job succeeded and the sink finished.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.finish_error.is_none()
    }
}

/// Runs job lists through one [`CompositionEngine`].
///
/// Base alpha masks are shared between the jobs of one run and dropped when it ends, so a later
/// run against a different asset source never sees stale silhouettes.
#[derive(Clone, Debug, Default)]
pub struct BatchDriver {
    engine: CompositionEngine,
    options: BatchOptions,
}

impl BatchDriver {
    /// Driver over `engine` with `options`.
    pub fn new(engine: CompositionEngine, options: BatchOptions) -> Self {
        Self { engine, options }
    }

    /// The engine jobs run through.
    pub fn engine(&self) -> &CompositionEngine {
        &self.engine
    }

    /// Execution settings.
    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Compose every job and hand each result to `sink` in job order.
    ///
    /// Per-job errors (missing assets, invalid sizes, strategy or sink failures) land in the
    /// report and never stop the batch, and a sink that fails to finish is recorded in
    /// [`BatchReport::finish_error`]. `Err` is reserved for setup problems: invalid options or a
    /// thread pool that cannot be built.
    #[tracing::instrument(skip(self, jobs, assets, sink), fields(jobs = jobs.len(), parallel = self.options.parallel))]
    pub fn run(
        &self,
        jobs: &[BatchJob],
        assets: &dyn AssetLookup,
        sink: &mut dyn OutputSink,
    ) -> DrapeResult<BatchReport> {
        self.options.strategy.validate()?;
        let chunk_size = self.options.chunk_size.max(1);

        let pool = if self.options.parallel {
            Some(build_thread_pool(self.options.threads)?)
        } else {
            None
        };

        let masks = MaskCache::new();
        let mut report = BatchReport::default();
        for (chunk_idx, chunk) in jobs.chunks(chunk_size).enumerate() {
            let offset = chunk_idx * chunk_size;
            let composed: Vec<DrapeResult<RasterBuffer>> = match &pool {
                Some(pool) => pool.install(|| {
                    chunk
                        .par_iter()
                        .map(|job| self.run_job(job, assets, &masks))
                        .collect()
                }),
                None => chunk.iter().map(|job| self.run_job(job, assets, &masks)).collect(),
            };

            for (i, (job, result)) in chunk.iter().zip(composed).enumerate() {
                let output_id = job.output_id();
                match result.and_then(|img| sink.write(&output_id, &img)) {
                    Ok(()) => report.successes.push(output_id),
                    Err(error) => {
                        tracing::warn!(
                            index = offset + i,
                            output_id = %output_id,
                            error = %error,
                            "batch job failed"
                        );
                        report.failures.push(BatchFailure {
                            index: offset + i,
                            job: job.clone(),
                            error,
                        });
                    }
                }
            }
        }

        if let Err(error) = sink.finish() {
            tracing::warn!(error = %error, "output sink failed to finish");
            report.finish_error = Some(error);
        }

        report.masks_derived = masks.derivations();
        tracing::info!(
            succeeded = report.successes.len(),
            failed = report.failures.len(),
            masks_derived = report.masks_derived,
            "batch finished"
        );
        Ok(report)
    }

    fn run_job(
        &self,
        job: &BatchJob,
        assets: &dyn AssetLookup,
        masks: &MaskCache,
    ) -> DrapeResult<RasterBuffer> {
        let graphic = assets.graphic(&job.graphic_id)?;
        let base = assets.base(&job.base_id)?;
        let mask = masks.get_or_derive(&job.base_id, &base);

        let (placement, size) =
            job.resolve(base.dimensions(), graphic.dimensions(), self.engine.config())?;
        let composite =
            self.engine
                .compose(&base, &graphic, &placement, size, &self.options.strategy)?;
        mask.apply(&composite)
    }
}

/// Run `jobs` once through a throwaway [`BatchDriver`].
pub fn run_batch(
    engine: &CompositionEngine,
    jobs: &[BatchJob],
    assets: &dyn AssetLookup,
    sink: &mut dyn OutputSink,
    options: &BatchOptions,
) -> DrapeResult<BatchReport> {
    BatchDriver::new(engine.clone(), options.clone()).run(jobs, assets, sink)
}

fn build_thread_pool(threads: Option<usize>) -> DrapeResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(DrapeError::validation(
            "batch 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| DrapeError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/batch/driver.rs"]
mod tests;
