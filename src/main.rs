use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixelkernels::config::{measure, seconds_or_sentinel};
use pixelkernels::filters::{self, stencil::identity_filter};
use pixelkernels::generators;
use pixelkernels::{Backend, ExecutionConfig, FilterMatrix, PixelMatrix, RgbPixel};

#[derive(Parser)]
#[command(name = "pixelkernels")]
#[command(about = "Run data-parallel image kernels on PNG files")]
struct Cli {
    /// Backend: cpu, openmp, opencl or cuda
    #[arg(short, long, default_value = "openmp")]
    backend: Backend,

    /// Worker threads (clamped to 1..=32)
    #[arg(short, long)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply one filter to an image
    Filter {
        /// Input PNG file path
        #[arg(short, long)]
        input: PathBuf,

        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,

        #[command(subcommand)]
        kernel: Kernel,
    },
    /// Render the Mandelbrot set to a PNG file
    Mandelbrot {
        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, default_value_t = 800)]
        width: usize,

        #[arg(long, default_value_t = 800)]
        height: usize,

        /// Visible extent relative to the image height
        #[arg(short, long, default_value_t = 3.0)]
        scale: f32,
    },
}

#[derive(Subcommand, Clone)]
enum Kernel {
    /// Separable Gaussian blur
    Gaussian {
        #[arg(short, long, default_value_t = 1.0)]
        sigma: f32,
    },
    /// Blend toward gray (0 = gray, 1 = unchanged)
    Desaturate {
        #[arg(short, long, default_value_t = 0.5)]
        saturation: f32,
    },
    Invert,
    /// Replace every hue with the given angle in radians
    Hue {
        #[arg(short, long, default_value_t = 0.0)]
        angle: f32,
    },
    /// Sobel edge detection
    Edges,
    /// Per-channel median over a (2r+1)x(2r+1) window
    Median {
        #[arg(short, long, default_value_t = 1)]
        radius: usize,
    },
    /// 3x3 convolution, coefficients in row-major order
    Stencil {
        /// Nine comma-separated weights (default: identity)
        #[arg(short, long, value_delimiter = ',')]
        coeffs: Option<Vec<f32>>,

        #[arg(long, default_value_t = 1.0)]
        scaling: f32,
    },
    /// Threshold intensity at 127
    BlackWhite,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixelkernels=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let cli = Cli::parse();
    let mut config = ExecutionConfig::default().with_backend(cli.backend);
    if let Some(threads) = cli.threads {
        config.set_thread_count(threads);
    }

    match run(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, config: &ExecutionConfig) -> anyhow::Result<()> {
    match command {
        Commands::Filter { input, output, kernel } => {
            let (image, load_secs) = load_image(&input);
            println!("Load time: {load_secs}");
            let Some(mut image) = image else {
                bail!("could not load {}", input.display());
            };

            let elapsed = apply(&kernel, config, &mut image);
            println!("Time: {}", seconds_or_sentinel(&elapsed));
            elapsed.context("filter failed")?;
            save_image(&image, &output)
        }
        Commands::Mandelbrot {
            output,
            width,
            height,
            scale,
        } => {
            let mut image = PixelMatrix::<RgbPixel>::new(height, width)?;
            let elapsed = generators::mandelbrot(config, &mut image, scale);
            println!("Time: {}", seconds_or_sentinel(&elapsed));
            elapsed.context("mandelbrot failed")?;
            save_image(&image, &output)
        }
    }
}

fn apply(
    kernel: &Kernel,
    config: &ExecutionConfig,
    image: &mut PixelMatrix<RgbPixel>,
) -> pixelkernels::Result<std::time::Duration> {
    match kernel {
        Kernel::Gaussian { sigma } => filters::gaussian(config, image, *sigma),
        Kernel::Desaturate { saturation } => filters::desaturate(config, image, *saturation),
        Kernel::Invert => filters::invert(config, image),
        Kernel::Hue { angle } => filters::hue_rotate(config, image, *angle),
        Kernel::Edges => filters::edge_detect(config, image),
        Kernel::Median { radius } => filters::median(config, image, *radius),
        Kernel::Stencil { coeffs, scaling } => {
            let filter = match coeffs {
                Some(c) => FilterMatrix::from_shape_vec((3, 3), c.clone())
                    .map_err(|e| pixelkernels::KernelError::InvalidParameter {
                        name: "coeffs",
                        reason: e.to_string(),
                    })?,
                None => identity_filter(),
            };
            filters::stencil(config, image, &filter, *scaling)
        }
        Kernel::BlackWhite => filters::black_white(config, image),
    }
}

/// Decode a file into an RGB matrix and time decode + copy.
///
/// # Returns
/// The image, or `None` with a seconds value of `-1.0` when decoding fails
fn load_image(path: &Path) -> (Option<PixelMatrix<RgbPixel>>, f32) {
    let (loaded, elapsed) = measure(|| -> anyhow::Result<PixelMatrix<RgbPixel>> {
        let decoded = image::open(path)
            .with_context(|| format!("failed to decode {}", path.display()))?
            .to_rgb8();
        let (width, height) = decoded.dimensions();
        Ok(PixelMatrix::from_bytes(height as usize, width as usize, decoded.as_raw())?)
    });

    match loaded {
        Ok(image) => (Some(image), elapsed.as_secs_f32()),
        Err(e) => {
            tracing::error!("{e:#}");
            (None, -1.0)
        }
    }
}

fn save_image(matrix: &PixelMatrix<RgbPixel>, path: &Path) -> anyhow::Result<()> {
    let (rows, cols) = matrix.dim();
    let buffer = image::RgbImage::from_raw(cols as u32, rows as u32, matrix.to_bytes())
        .context("pixel buffer does not match image dimensions")?;
    buffer
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), rows, cols, "image saved");
    Ok(())
}
