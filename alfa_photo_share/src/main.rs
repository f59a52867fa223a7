//! ALFA Photo Share - CLI
//!
//! Runs the capture-and-share workflow against the desktop host.

use std::path::{Path, PathBuf};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use alfa_photo_share::cache::CacheDir;
use alfa_photo_share::{
    CacheProvider, DesktopPlatform, Event, Notice, PermissionMode, PhotoShareApp, ShareConfig,
};

#[derive(Parser)]
#[command(name = "alfa-share")]
#[command(author = "Karen Tonoyan")]
#[command(version = alfa_photo_share::VERSION)]
#[command(about = "ALFA Photo Share - capture a batch of photos and share them in one go")]
struct Cli {
    /// Config file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cache root (overrides config)
    #[arg(long)]
    cache: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture the given images and share them
    Run {
        /// Images the camera will "take", in order
        #[arg(required = true)]
        photos: Vec<PathBuf>,

        /// Share as one ZIP instead of individual images
        #[arg(short, long)]
        archive: bool,

        /// Where the share chooser drops shared files
        #[arg(short, long, default_value = "./shared")]
        out: PathBuf,

        /// Simulated permission dialog
        #[arg(long, value_enum, default_value_t = PermissionMode::Granted)]
        permission: PermissionMode,
    },

    /// Generate sample images and share them as a ZIP
    Demo {
        /// Number of photos
        #[arg(short, long, default_value_t = 3)]
        count: usize,

        #[arg(short, long, default_value = "./demo_shared")]
        out: PathBuf,
    },

    /// Delete everything in the image cache
    ClearCache,

    /// Show cache statistics
    Stats,

    /// Print the effective configuration
    Config,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<ShareConfig> {
    let mut config = match &cli.config {
        Some(path) => ShareConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ShareConfig::default(),
    };
    if let Some(cache) = &cli.cache {
        config.cache_root = cache.clone();
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Run { photos, archive, out, permission } => {
            for photo in &photos {
                if !photo.is_file() {
                    bail!("not a file: {}", photo.display());
                }
            }
            session(config, &photos, archive, &out, permission)?;
        }

        Commands::Demo { count, out } => {
            let workdir = std::env::temp_dir().join(format!("alfa_share_demo_{}", std::process::id()));
            std::fs::create_dir_all(&workdir)?;

            let photos = (0..count)
                .map(|i| write_sample(&workdir, i))
                .collect::<anyhow::Result<Vec<_>>>()?;

            println!("🎮 ALFA Photo Share - Demo Mode");
            println!("{:-<40}", "");
            let result = session(config, &photos, true, &out, PermissionMode::Grant);
            let _ = std::fs::remove_dir_all(&workdir);
            result?;
        }

        Commands::ClearCache => {
            let removed = CacheDir::new(&config).clear()?;
            println!("✅ Cache cleared ({} file(s) removed)", removed);
        }

        Commands::Stats => {
            let stats = CacheDir::new(&config).stats()?;
            println!("📊 ALFA Photo Share Cache");
            println!("{:-<40}", "");
            println!("Location:   {}", config.image_root().display());
            println!("Images:     {}", stats.images);
            println!("Archives:   {}", stats.archives);
            println!("Other:      {}", stats.other);
            println!("Total size: {} KB", stats.total_bytes / 1024);
        }

        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Capture every photo, then share the batch
fn session(
    config: ShareConfig,
    photos: &[PathBuf],
    archive: bool,
    out: &Path,
    permission: PermissionMode,
) -> anyhow::Result<()> {
    let mut platform = DesktopPlatform::new(CacheProvider::new(&config), out, permission);
    for photo in photos {
        platform.queue_photo(photo);
    }

    let mut app = PhotoShareApp::start(platform, config)?;

    while app.platform().queued() > 0 {
        let mut notices: Vec<_> = app.dispatch(Event::TakePhoto).into_iter().collect();
        let mut progressed = false;
        while let Some(event) = app.platform_mut().next_result() {
            progressed = true;
            notices.extend(app.dispatch(event));
        }

        for notice in &notices {
            let icon = if notice.is_error() { "⚠️" } else { "📷" };
            println!("{} {}", icon, notice);
        }
        if notices.contains(&Notice::PermissionDenied) {
            bail!("camera permission denied");
        }
        if !progressed {
            bail!("camera did not start");
        }
    }

    let event = if archive { Event::ShareArchive } else { Event::ShareDirect };
    match app.dispatch(event) {
        Some(notice) if notice.is_error() => bail!("{}", notice),
        Some(notice) => println!("✅ {}", notice),
        None => {}
    }
    for request in app.platform().shared() {
        println!("   {} x{}", request.mime_type, request.references.len());
    }
    println!("📁 Shared files in: {}", app.platform().outbox().display());

    Ok(())
}

fn write_sample(dir: &Path, index: usize) -> anyhow::Result<PathBuf> {
    let path = dir.join(format!("sample_{}.jpg", index + 1));
    let shade = (40 + index * 60 % 200) as u8;
    let img = image::RgbImage::from_fn(320, 240, |x, y| {
        image::Rgb([shade, (x % 256) as u8, (y % 256) as u8])
    });
    img.save_with_format(&path, image::ImageFormat::Jpeg)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
