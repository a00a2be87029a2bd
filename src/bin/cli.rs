//! imgstore Management CLI
//!
//! Operates directly on a local store file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use imgstore::{compact, Config, ImgStore, ImgStoreError, OpenMode, Resolution, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// imgstore management tool
#[derive(Parser, Debug)]
#[command(name = "imgstore-mgr")]
#[command(about = "Create, inspect and modify imgstore files")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the header and every stored image
    List {
        store: PathBuf,

        /// Print {"Images":[...]} instead of the text dump
        #[arg(long)]
        json: bool,
    },

    /// Create a new, empty store
    Create {
        store: PathBuf,

        /// Number of metadata slots
        #[arg(long)]
        max_files: Option<u32>,

        /// Thumbnail bounding box
        #[arg(long, num_args = 2, value_names = ["W", "H"])]
        thumb_res: Option<Vec<u16>>,

        /// Small-image bounding box
        #[arg(long, num_args = 2, value_names = ["W", "H"])]
        small_res: Option<Vec<u16>>,
    },

    /// Read an image and write it to <id>_<resolution>.jpg
    Read {
        store: PathBuf,
        id: String,

        /// orig, small or thumb
        #[arg(default_value = "orig")]
        resolution: String,
    },

    /// Insert a JPEG file under an id
    Insert {
        store: PathBuf,
        id: String,
        file: PathBuf,
    },

    /// Delete an image
    Delete { store: PathBuf, id: String },

    /// Rebuild the store without deleted entries, using <tmp> as scratch
    Gc { store: PathBuf, tmp: PathBuf },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args.command) {
        eprintln!("ERROR: {}", e);
        std::process::exit(i32::from(e.code()));
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::List { store, json } => {
            let store = ImgStore::open(&store, OpenMode::ReadOnly)?;
            if json {
                println!("{}", store.list_json()?);
            } else {
                store.write_listing(&mut io::stdout().lock())?;
            }
            Ok(())
        }

        Commands::Create {
            store,
            max_files,
            thumb_res,
            small_res,
        } => {
            let mut builder = Config::builder();
            if let Some(max_files) = max_files {
                builder = builder.max_files(max_files);
            }
            if let Some([w, h]) = thumb_res.as_deref().map(pair).transpose()? {
                builder = builder.thumb_res(w, h);
            }
            if let Some([w, h]) = small_res.as_deref().map(pair).transpose()? {
                builder = builder.small_res(w, h);
            }
            let config = builder.build().store_config();

            ImgStore::create(&store, &config)?;
            println!(
                "Created {} with {} slots, thumb {}x{}, small {}x{}",
                store.display(),
                config.max_files,
                config.thumb_res.width,
                config.thumb_res.height,
                config.small_res.width,
                config.small_res.height
            );
            Ok(())
        }

        Commands::Read {
            store,
            id,
            resolution,
        } => {
            let res: Resolution = resolution.parse()?;
            let mut store = ImgStore::open(&store, OpenMode::ReadWrite)?;
            let image = store.read(&id, res)?;
            let out = output_name(&id, res);
            fs::write(&out, &image)?;
            println!("Wrote {} ({} bytes)", out.display(), image.len());
            Ok(())
        }

        Commands::Insert { store, id, file } => {
            let image = read_image(&file)?;
            let mut store = ImgStore::open(&store, OpenMode::ReadWrite)?;
            store.insert(&image, &id)?;
            Ok(())
        }

        Commands::Delete { store, id } => {
            let mut store = ImgStore::open(&store, OpenMode::ReadWrite)?;
            store.delete(&id)
        }

        Commands::Gc { store, tmp } => {
            let stats = compact(&store, &tmp)?;
            println!(
                "Compacted {} image(s), {} -> {} bytes",
                stats.entries, stats.bytes_before, stats.bytes_after
            );
            Ok(())
        }
    }
}

/// `<id>_<res>.jpg` in the current directory
fn output_name(id: &str, res: Resolution) -> PathBuf {
    PathBuf::from(format!("{}_{}.jpg", id, res.name()))
}

fn read_image(path: &Path) -> Result<Vec<u8>> {
    let bytes = fs::read(path)?;
    if bytes.is_empty() {
        return Err(ImgStoreError::InvalidArgument(format!(
            "{} is empty",
            path.display()
        )));
    }
    Ok(bytes)
}

fn pair(values: &[u16]) -> Result<[u16; 2]> {
    match values {
        [w, h] => Ok([*w, *h]),
        _ => Err(ImgStoreError::InvalidArgument(
            "expected a width and a height".to_string(),
        )),
    }
}
