//! Execution configuration and kernel timing.
//!
//! [`ExecutionConfig`] is a small `Copy` value handed to every kernel entry
//! point. Kernels read it when they start, so whatever value the caller
//! passes on the next call is the one that applies.
//!
//! ## Backends
//!
//! | Name | Workers | Notes |
//! |------|---------|-------|
//! | `cpu` | 1 | sequential reference |
//! | `openmp` | `threads` | rayon pool |
//! | `opencl`, `cuda` | `threads` | accepted names, same CPU-parallel path |
//!
//! Every backend produces bit-identical results.

#[cfg(not(target_arch = "wasm32"))]
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
#[cfg(not(target_arch = "wasm32"))]
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use crate::error::{KernelError, Result};

pub const MIN_THREADS: usize = 1;
pub const MAX_THREADS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Backend {
    Cpu,
    #[default]
    OpenMp,
    OpenCl,
    Cuda,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Cpu => "cpu",
            Backend::OpenMp => "openmp",
            Backend::OpenCl => "opencl",
            Backend::Cuda => "cuda",
        }
    }

    pub fn is_parallel(&self) -> bool {
        !matches!(self, Backend::Cpu)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(Backend::Cpu),
            "openmp" | "omp" => Ok(Backend::OpenMp),
            "opencl" => Ok(Backend::OpenCl),
            "cuda" => Ok(Backend::Cuda),
            _ => Err(KernelError::UnknownBackend(s.to_string())),
        }
    }
}

/// Clamp a requested worker count into `[MIN_THREADS, MAX_THREADS]`.
pub fn clamp_threads(n: usize) -> usize {
    n.clamp(MIN_THREADS, MAX_THREADS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionConfig {
    backend: Backend,
    threads: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(MIN_THREADS);
        ExecutionConfig::new(Backend::default(), threads)
    }
}

impl ExecutionConfig {
    pub fn new(backend: Backend, threads: usize) -> Self {
        ExecutionConfig {
            backend,
            threads: clamp_threads(threads),
        }
    }

    /// Single worker, sequential reference path.
    pub fn sequential() -> Self {
        ExecutionConfig::new(Backend::Cpu, 1)
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn set_backend(&mut self, backend: Backend) {
        self.backend = backend;
    }

    /// Set the backend from its name, e.g. `"openmp"`.
    pub fn set_backend_name(&mut self, name: &str) -> Result<()> {
        self.backend = name.parse()?;
        Ok(())
    }

    pub fn thread_count(&self) -> usize {
        self.threads
    }

    /// Values outside `[1, 32]` are clamped.
    pub fn set_thread_count(&mut self, threads: usize) {
        self.threads = clamp_threads(threads);
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.set_backend(backend);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.set_thread_count(threads);
        self
    }

    /// Workers actually used by a kernel run.
    pub fn workers(&self) -> usize {
        if self.backend.is_parallel() {
            self.threads
        } else {
            1
        }
    }

    /// Run one kernel body on a pool sized for this config and time it.
    ///
    /// The clock starts once the pool is ready and stops after `body` has
    /// written its results. `install` blocks until every task spawned by the
    /// body has finished, so no work is left outstanding.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn run<F>(&self, kernel: &'static str, body: F) -> Result<Duration>
    where
        F: FnOnce() -> Result<()> + Send,
    {
        let pool = worker_pool(self.workers())?;

        let (outcome, elapsed) = measure(|| pool.install(body));
        self.report(kernel, outcome, elapsed)
    }

    /// wasm32 has neither worker threads nor a monotonic clock: the body runs
    /// on the calling thread and the reported duration is zero.
    #[cfg(target_arch = "wasm32")]
    pub fn run<F>(&self, kernel: &'static str, body: F) -> Result<Duration>
    where
        F: FnOnce() -> Result<()> + Send,
    {
        self.report(kernel, body(), Duration::ZERO)
    }

    fn report(&self, kernel: &'static str, outcome: Result<()>, elapsed: Duration) -> Result<Duration> {
        match &outcome {
            Ok(()) => tracing::debug!(
                kernel,
                backend = %self.backend,
                workers = self.workers(),
                elapsed_s = elapsed.as_secs_f64(),
                "kernel finished"
            ),
            Err(e) => tracing::warn!(kernel, error = %e, "kernel rejected"),
        }
        outcome.map(|()| elapsed)
    }
}

/// Process-wide rayon pool with `workers` threads, built on first request.
///
/// Worker counts are clamped to `[MIN_THREADS, MAX_THREADS]`, so at most 32
/// pools ever exist.
#[cfg(not(target_arch = "wasm32"))]
fn worker_pool(workers: usize) -> Result<Arc<rayon::ThreadPool>> {
    static POOLS: OnceLock<Mutex<HashMap<usize, Arc<rayon::ThreadPool>>>> = OnceLock::new();

    let workers = clamp_threads(workers);
    let mut pools = POOLS
        .get_or_init(Default::default)
        .lock()
        .unwrap_or_else(|e| e.into_inner());
    if let Some(pool) = pools.get(&workers) {
        return Ok(Arc::clone(pool));
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(move |i| format!("pixelkernels-{workers}-{i}"))
        .build()
        .map_err(|e| KernelError::ThreadPool(e.to_string()))?;
    let pool = Arc::new(pool);
    pools.insert(workers, Arc::clone(&pool));
    tracing::debug!(workers, "worker pool created");
    Ok(pool)
}

/// Wall-clock duration of any invocation.
pub fn measure<R, F: FnOnce() -> R>(f: F) -> (R, Duration) {
    let start = Instant::now();
    let out = f();
    (out, start.elapsed())
}

/// Elapsed seconds, or `-1.0` when the kernel failed.
pub fn seconds_or_sentinel(result: &Result<Duration>) -> f32 {
    match result {
        Ok(d) => d.as_secs_f32(),
        Err(_) => -1.0,
    }
}
