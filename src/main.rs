use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn, Level};

use memoir::{
    catalog::{AspectRatio, CatalogEntry, FilmStock, FrameType, PaperType},
    config::Config,
    export::{ArboardClipboard, Delivery, Exporter},
    render::TextRenderer,
    session::{notify::Level as NoteLevel, CompositionState, FontFamily, KeyChord, ManualClock, Session},
    source::ImageLoader,
};

#[derive(Parser)]
#[command(
    name = "memoir",
    version,
    about = "Style a photo as an analog print",
    long_about = "Memoir develops a photo into a print: a film-stock look, paper, frame, grain, vignette and a caption, exported as a PNG or copied to the clipboard."
)]
struct Cli {
    /// Photo to print (file path or data: URI); a placeholder is fetched if omitted
    #[arg(short, long)]
    input: Option<String>,

    /// Film stock id (standard, portra400, ilford-bw, cinestill, ektar)
    #[arg(short, long)]
    stock: Option<FilmStock>,

    /// Paper id (alabaster, pure-white, matte-black, kraft)
    #[arg(short, long)]
    paper: Option<PaperType>,

    /// Print format (1:1, 4:5, 16:9, 2:3, 3:2, 4:3, 5:4)
    #[arg(short, long)]
    ratio: Option<AspectRatio>,

    /// Frame id (classic, gallery, film-strip, polaroid)
    #[arg(short, long)]
    frame: Option<FrameType>,

    /// Caption, at most 40 characters
    #[arg(long)]
    caption: Option<String>,

    /// Caption typeface (mono, serif, script)
    #[arg(long)]
    font: Option<FontFamily>,

    /// Horizontal photo position, 0-100
    #[arg(long)]
    x: Option<i64>,

    /// Vertical photo position, 0-100
    #[arg(long)]
    y: Option<i64>,

    /// Grain strength, 0-100
    #[arg(long)]
    grain: Option<i64>,

    /// Vignette strength, 0-100
    #[arg(long)]
    vignette: Option<i64>,

    /// Warmth, 0-100
    #[arg(long)]
    warmth: Option<i64>,

    /// Shortcuts replayed after the edits, e.g. `ctrl+z` or `ctrl+shift+z`
    #[arg(long, num_args = 1..)]
    keys: Vec<String>,

    /// Copy the print to the clipboard instead of saving a file
    #[arg(long)]
    copy: bool,

    /// Directory for saved prints (overrides the configuration)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List the catalog and exit
    #[arg(long)]
    list: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

type Edit = Box<dyn FnOnce(&mut CompositionState)>;

impl Cli {
    /// Every requested change as a separate edit, in a fixed order
    fn edits(&self) -> Vec<Edit> {
        let mut edits: Vec<Edit> = Vec::new();
        if let Some(stock) = self.stock {
            edits.push(Box::new(move |s| s.set_film_stock(stock)));
        }
        if let Some(paper) = self.paper {
            edits.push(Box::new(move |s| s.set_paper(paper)));
        }
        if let Some(ratio) = self.ratio {
            edits.push(Box::new(move |s| s.set_aspect_ratio(ratio)));
        }
        if let Some(frame) = self.frame {
            edits.push(Box::new(move |s| s.set_frame(frame)));
        }
        if let Some(caption) = self.caption.clone() {
            edits.push(Box::new(move |s| s.set_caption(&caption)));
        }
        if let Some(font) = self.font {
            edits.push(Box::new(move |s| s.set_font_family(font)));
        }
        if let Some(x) = self.x {
            edits.push(Box::new(move |s| s.set_horizontal_position(x)));
        }
        if let Some(y) = self.y {
            edits.push(Box::new(move |s| s.set_vertical_position(y)));
        }
        if let Some(grain) = self.grain {
            edits.push(Box::new(move |s| s.set_grain(grain)));
        }
        if let Some(vignette) = self.vignette {
            edits.push(Box::new(move |s| s.set_vignette(vignette)));
        }
        if let Some(warmth) = self.warmth {
            edits.push(Box::new(move |s| s.set_warmth(warmth)));
        }
        edits
    }
}

fn print_catalog() {
    println!("Film stocks:");
    for stock in FilmStock::all() {
        println!("  {:<12} {:<16} {}", stock.id(), stock.name(), stock.description());
    }
    println!("Papers:");
    for paper in PaperType::all() {
        println!("  {:<12} {}", paper.id(), paper.name());
    }
    println!("Formats:");
    for ratio in AspectRatio::all() {
        println!("  {}", ratio.label());
    }
    println!("Frames:");
    for frame in FrameType::all() {
        println!("  {:<12} {}", frame.id(), frame.name());
    }
    println!("Fonts:");
    for font in FontFamily::ALL {
        println!("  {}", font.id());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    if cli.list {
        print_catalog();
        return Ok(());
    }

    info!("Starting Memoir v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };
    if let Some(dir) = &cli.out_dir {
        config.export.download_dir = dir.clone();
    }

    // Edits are replayed as discrete steps, each settling into its own history entry
    let clock = ManualClock::new();
    let mut session = Session::new(&config, clock.clone());

    let loader = ImageLoader::new();
    match &cli.input {
        Some(input) => {
            let image = ImageLoader::load_input(input).await?;
            session.replace_image(image);
        }
        None => {
            let mut rng = rand::thread_rng();
            let source = loader.fetch_placeholder(&config.placeholder, &mut rng).await;
            session.load_initial(source);
        }
    }

    for edit in cli.edits() {
        session.update(edit);
        clock.advance(config.history.debounce_ms);
        session.tick();
    }

    for key in &cli.keys {
        match KeyChord::parse(key).and_then(|chord| session.handle_key(chord)) {
            Some(command) => info!("{}: {:?}", key, command),
            None => warn!("Ignoring unknown shortcut: {}", key),
        }
    }

    let state = session.state();
    info!(
        "🎞️  {} on {}, {} {}",
        state.film_stock().name(),
        state.paper().name(),
        state.aspect_ratio().label(),
        state.frame().name()
    );

    let delivery = if cli.copy {
        Delivery::Clipboard
    } else {
        Delivery::Download { dir: config.export.download_dir.clone() }
    };
    let kind = delivery.kind();
    let job = session
        .begin_export(delivery)
        .ok_or_else(|| anyhow::anyhow!("An export is already running"))?;

    let exporter = Exporter::new(&config.export, TextRenderer::new(), Arc::new(ArboardClipboard));
    let result = exporter.export(job).await;
    session.finish_export(kind, &result);

    for note in session.notifications() {
        match note.level {
            NoteLevel::Info => info!("{}", note.message),
            NoteLevel::Error => warn!("{}", note.message),
        }
    }

    result?;
    info!("✨ Print developed");
    Ok(())
}
