use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use fusecast_core::candidates::{generate_candidates, OVERLAP_THRESHOLD};
use fusecast_core::resolver::resolve_conflicts;
use fusecast_core::{pipeline, DetectionStore, FusionConfig};
use fusecast_store::SqliteStore;

mod annotate;
mod cast;

use cast::CastList;

#[derive(Parser)]
#[command(name = "fusecast", about = "Fuse REID face detections with person ROIs per frame")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run fusion over a worklist of movies
    Run {
        /// Path to the detection database
        #[arg(long)]
        db: PathBuf,
        /// Movie ids to fuse
        movie_ids: Vec<String>,
        /// File with one movie id per line, merged with the positional ids
        #[arg(long)]
        worklist: Option<PathBuf>,
        /// Containment-score threshold for candidate pairs
        #[arg(long, default_value_t = OVERLAP_THRESHOLD)]
        threshold: f64,
        /// Flat file of actor names, line N = face id N
        #[arg(long)]
        cast_list: Option<PathBuf>,
    },
    /// Print the stored fusion record for one frame as JSON
    Show {
        #[arg(long)]
        db: PathBuf,
        movie_id: String,
        frame_num: i64,
    },
    /// Re-derive one frame's matches and draw them onto an image
    Annotate {
        #[arg(long)]
        db: PathBuf,
        movie_id: String,
        frame_num: i64,
        /// Frame image to annotate
        #[arg(long)]
        image: PathBuf,
        /// Output path for the annotated image
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = OVERLAP_THRESHOLD)]
        threshold: f64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            db,
            movie_ids,
            worklist,
            threshold,
            cast_list,
        } => run_worklist(db, movie_ids, worklist, threshold, cast_list),
        Commands::Show {
            db,
            movie_id,
            frame_num,
        } => show_record(db, &movie_id, frame_num),
        Commands::Annotate {
            db,
            movie_id,
            frame_num,
            image,
            out,
            threshold,
        } => annotate_frame(db, &movie_id, frame_num, &image, &out, threshold),
    }
}

/// Run fusion per movie, never letting one failed unit stop the batch.
fn run_worklist(
    db: PathBuf,
    mut movie_ids: Vec<String>,
    worklist: Option<PathBuf>,
    threshold: f64,
    cast_list: Option<PathBuf>,
) -> Result<()> {
    if let Some(path) = worklist {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading worklist {}", path.display()))?;
        movie_ids.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from),
        );
    }
    if movie_ids.is_empty() {
        bail!("no movie ids given (positional args or --worklist)");
    }

    let store = SqliteStore::open(&db)?;
    let directory = match cast_list {
        Some(path) => CastList::from_file(&path)
            .with_context(|| format!("reading cast list {}", path.display()))?,
        None => CastList::default(),
    };
    let config = FusionConfig {
        overlap_threshold: threshold,
    };

    tracing::info!(movies = movie_ids.len(), "starting worklist");

    let mut skipped = Vec::new();
    for movie_id in &movie_ids {
        match pipeline::run_fusion(&store, &store, &directory, &config, movie_id) {
            Ok(summary) => {
                tracing::info!(
                    movie_id = %movie_id,
                    frames = summary.frames_fused,
                    matched = summary.faces_matched,
                    elapsed = ?summary.elapsed,
                    "movie fused"
                );
            }
            Err(err) => {
                tracing::error!(movie_id = %movie_id, error = %err, "movie skipped");
                skipped.push(movie_id.clone());
            }
        }
    }

    tracing::info!(
        fused = movie_ids.len() - skipped.len(),
        skipped = skipped.len(),
        "worklist finished"
    );
    if !skipped.is_empty() {
        println!("Skipped movie ids: {skipped:?}");
    }
    Ok(())
}

fn show_record(db: PathBuf, movie_id: &str, frame_num: i64) -> Result<()> {
    let store = SqliteStore::open(&db)?;
    match store.get_fusion_record(movie_id, frame_num)? {
        Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
        None => bail!("no fusion record for {movie_id} frame {frame_num}"),
    }
    Ok(())
}

/// Re-run candidate generation and resolution for one frame and draw the
/// surviving matches onto a local copy of the frame image.
fn annotate_frame(
    db: PathBuf,
    movie_id: &str,
    frame_num: i64,
    image_path: &PathBuf,
    out: &PathBuf,
    threshold: f64,
) -> Result<()> {
    let store = SqliteStore::open(&db)?;

    let frame = store
        .fetch_reid_frames(movie_id)?
        .into_iter()
        .find(|f| f.frame_num == frame_num)
        .with_context(|| format!("no REID frame {frame_num} for {movie_id}"))?;
    let clues = store
        .fetch_visual_clues(movie_id, frame_num)?
        .with_context(|| format!("no visual clues for {movie_id} frame {frame_num}"))?;

    let person_rois = clues.person_rois()?;
    let candidates = generate_candidates(&frame.faces, &person_rois, threshold)?;
    let matches = resolve_conflicts(candidates);
    if matches.is_empty() {
        bail!("no matches to draw for {movie_id} frame {frame_num}");
    }

    let mut img = image::open(image_path)
        .with_context(|| format!("opening {}", image_path.display()))?
        .to_rgb8();
    annotate::draw_matches(&mut img, &matches);
    img.save(out)
        .with_context(|| format!("writing {}", out.display()))?;

    tracing::info!(
        movie_id,
        frame_num,
        matches = matches.len(),
        out = %out.display(),
        "annotated frame written"
    );
    Ok(())
}
