use atelier::catalog::{
    self, Article, ArticleForm, Artist, ArtistForm, HeroForm, HeroItem, JsonStore, NoopInvalidator,
    PageRequest, Paged, Painting, PaintingForm,
};
use atelier::cdn::ImageKitClient;
use atelier::config::AppConfig;
use atelier::imaging::RustBackend;
use atelier::media;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "atelier")]
#[command(about = "Back-office admin for a gallery catalog")]
#[command(long_about = "\
Back-office admin for a gallery catalog

Records live in a versioned JSON document store; images live on a hosted
CDN at four resolutions (original, 150, 300, 1000) per painting image.

Typical flow:

  atelier painting create p-042
  atelier painting update p-042 --form painting.json
  atelier painting attach p-042 scroll.jpg
  atelier painting set-rendered p-042 0 true
  atelier painting list --artist-id a-007

Forms are JSON files validated before anything is written; run a command
with an empty form to see which fields are required. CDN-touching commands
(attach, detach, delete) need the [cdn] section of config.toml filled in.

Run 'atelier gen-config' to print a documented stock config.toml.")]
#[command(version)]
struct Cli {
    /// Path to config.toml
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Painting records and their image sets
    Painting {
        #[command(subcommand)]
        command: PaintingCmd,
    },
    /// Artist records
    Artist {
        #[command(subcommand)]
        command: ArtistCmd,
    },
    /// Hero banner items
    Hero {
        #[command(subcommand)]
        command: HeroCmd,
    },
    /// Editorial articles
    Article {
        #[command(subcommand)]
        command: ArticleCmd,
    },
    /// Per-collection record counts
    Stats,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct PageArgs {
    /// Page number (1-based)
    #[arg(long, default_value_t = 1)]
    page: usize,
    /// Records per page
    #[arg(long, default_value_t = 10)]
    page_size: usize,
}

#[derive(Subcommand)]
enum PaintingCmd {
    /// List paintings, optionally filtered by exact id match
    List {
        #[command(flatten)]
        page: PageArgs,
        /// Only the painting with this business key
        #[arg(long)]
        painting_id: Option<String>,
        /// Only paintings of this artist
        #[arg(long)]
        artist_id: Option<String>,
    },
    /// Print one painting as JSON
    Show { painting_id: String },
    /// Create an empty painting under a fresh business key
    Create { painting_id: String },
    /// Apply a field-set update from a JSON form
    Update {
        painting_id: String,
        #[arg(long)]
        form: PathBuf,
    },
    /// Delete a painting, its artist reference, and its CDN objects
    Delete { painting_id: String },
    /// Resize an image to all derived sizes, upload, and append it
    Attach {
        painting_id: String,
        /// Source image file (JPEG/PNG/WebP)
        image: PathBuf,
    },
    /// Remove the image with this original URL
    Detach { painting_id: String, url: String },
    /// Toggle an image's rendered flag
    SetRendered {
        painting_id: String,
        index: usize,
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
}

#[derive(Subcommand)]
enum ArtistCmd {
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    Show {
        artist_id: String,
    },
    Create {
        artist_id: String,
        #[arg(long)]
        form: PathBuf,
    },
    Update {
        artist_id: String,
        #[arg(long)]
        form: PathBuf,
    },
    /// Upload a new profile image and drop the previous one
    SetProfileImage {
        artist_id: String,
        image: PathBuf,
    },
}

#[derive(Subcommand)]
enum HeroCmd {
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    Show {
        hero_id: String,
    },
    Create {
        hero_id: String,
        #[arg(long)]
        form: PathBuf,
    },
    Update {
        hero_id: String,
        #[arg(long)]
        form: PathBuf,
    },
    Delete {
        hero_id: String,
    },
}

#[derive(Subcommand)]
enum ArticleCmd {
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    Show {
        article_id: String,
    },
    Create {
        article_id: String,
        #[arg(long)]
        form: PathBuf,
    },
    Update {
        article_id: String,
        #[arg(long)]
        form: PathBuf,
    },
    Delete {
        article_id: String,
    },
}

fn read_form<T: DeserializeOwned>(path: &PathBuf) -> Result<T, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_page_footer<T>(page: &Paged<T>, request: PageRequest) {
    println!(
        "page {}/{} ({} total{})",
        request.page,
        page.total_pages.max(1),
        page.total_items,
        if page.has_next { ", more available" } else { "" }
    );
}

fn open_cdn(config: &AppConfig) -> Result<ImageKitClient, Box<dyn std::error::Error>> {
    config.cdn.validate_for_use()?;
    Ok(ImageKitClient::new(
        config.cdn.auth_endpoint.clone(),
        config.cdn.upload_endpoint.clone(),
        config.cdn.delete_endpoint.clone(),
        config.cdn.public_key.clone(),
        config.cdn.timeout(),
    )?)
}

fn file_name_of(path: &PathBuf) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image.jpg".to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", AppConfig::stock_toml());
        return Ok(());
    }

    let config = AppConfig::load(&cli.config)?;
    let store = JsonStore::open(&config.store.root)?;
    let invalidator = NoopInvalidator;

    match cli.command {
        Command::GenConfig => unreachable!("handled before store open"),

        Command::Painting { command } => match command {
            PaintingCmd::List {
                page,
                painting_id,
                artist_id,
            } => {
                let request = PageRequest::new(page.page, page.page_size);
                let result = store.page_where::<Painting, _>(request, |p| {
                    painting_id.as_deref().is_none_or(|id| p.painting_id == id)
                        && artist_id.as_deref().is_none_or(|id| p.artist_id == id)
                })?;
                if result.items.is_empty() {
                    println!("no paintings found");
                }
                for p in &result.items {
                    println!(
                        "{}  {} — artist {} ({} images)",
                        p.painting_id,
                        if p.title.is_empty() { "(untitled)" } else { p.title.as_str() },
                        if p.artist_id.is_empty() { "-" } else { p.artist_id.as_str() },
                        p.images.len()
                    );
                }
                print_page_footer(&result, request);
            }
            PaintingCmd::Show { painting_id } => {
                print_json(&store.get_required::<Painting>(&painting_id)?.record)?;
            }
            PaintingCmd::Create { painting_id } => {
                let p = catalog::create_painting(&store, &invalidator, &painting_id)?;
                println!("created painting {}", p.painting_id);
            }
            PaintingCmd::Update { painting_id, form } => {
                let form: PaintingForm = read_form(&form)?;
                let p = catalog::update_painting(&store, &invalidator, &painting_id, form)?;
                println!("updated painting {}", p.painting_id);
            }
            PaintingCmd::Delete { painting_id } => {
                let cdn = open_cdn(&config)?;
                catalog::delete_painting(&store, &cdn, &invalidator, &painting_id)?;
                println!("deleted painting {painting_id}");
            }
            PaintingCmd::Attach { painting_id, image } => {
                let cdn = open_cdn(&config)?;
                let blob = std::fs::read(&image)?;
                let index = media::attach_image(
                    &store,
                    &cdn,
                    &RustBackend::new(),
                    &invalidator,
                    &painting_id,
                    &blob,
                    &file_name_of(&image),
                )?;
                println!("attached image at index {index}");
            }
            PaintingCmd::Detach { painting_id, url } => {
                let cdn = open_cdn(&config)?;
                media::detach_image(&store, &cdn, &invalidator, &painting_id, &url)?;
                println!("detached image {url}");
            }
            PaintingCmd::SetRendered {
                painting_id,
                index,
                value,
            } => {
                media::set_rendered(&store, &invalidator, &painting_id, index, value)?;
                println!("set rendered[{index}] = {value}");
            }
        },

        Command::Artist { command } => match command {
            ArtistCmd::List { page } => {
                let request = PageRequest::new(page.page, page.page_size);
                let result = store.page::<Artist>(request)?;
                for a in &result.items {
                    println!(
                        "{}  {} ({} paintings)",
                        a.artist_id,
                        a.name,
                        a.paintings.len()
                    );
                }
                print_page_footer(&result, request);
            }
            ArtistCmd::Show { artist_id } => {
                print_json(&store.get_required::<Artist>(&artist_id)?.record)?;
            }
            ArtistCmd::Create { artist_id, form } => {
                let form: ArtistForm = read_form(&form)?;
                let a = catalog::create_artist(&store, &invalidator, &artist_id, form)?;
                println!("created artist {}", a.artist_id);
            }
            ArtistCmd::Update { artist_id, form } => {
                let form: ArtistForm = read_form(&form)?;
                let a = catalog::update_artist(&store, &invalidator, &artist_id, form)?;
                println!("updated artist {}", a.artist_id);
            }
            ArtistCmd::SetProfileImage { artist_id, image } => {
                let cdn = open_cdn(&config)?;
                let blob = std::fs::read(&image)?;
                let a = catalog::set_artist_profile_image(
                    &store,
                    &cdn,
                    &invalidator,
                    &artist_id,
                    &blob,
                    &file_name_of(&image),
                )?;
                println!("profile image set: {}", a.profile_image);
            }
        },

        Command::Hero { command } => match command {
            HeroCmd::List { page } => {
                let request = PageRequest::new(page.page, page.page_size);
                let result = store.page::<HeroItem>(request)?;
                for h in &result.items {
                    println!(
                        "{}  {} — {} (painting {})",
                        h.hero_id, h.title, h.artist_name, h.painting_id
                    );
                }
                print_page_footer(&result, request);
            }
            HeroCmd::Show { hero_id } => {
                print_json(&store.get_required::<HeroItem>(&hero_id)?.record)?;
            }
            HeroCmd::Create { hero_id, form } => {
                let form: HeroForm = read_form(&form)?;
                let h = catalog::create_hero_item(&store, &invalidator, &hero_id, form)?;
                println!("created hero item {}", h.hero_id);
            }
            HeroCmd::Update { hero_id, form } => {
                let form: HeroForm = read_form(&form)?;
                let h = catalog::update_hero_item(&store, &invalidator, &hero_id, form)?;
                println!("updated hero item {}", h.hero_id);
            }
            HeroCmd::Delete { hero_id } => {
                let cdn = open_cdn(&config)?;
                catalog::delete_hero_item(&store, &cdn, &invalidator, &hero_id)?;
                println!("deleted hero item {hero_id}");
            }
        },

        Command::Article { command } => match command {
            ArticleCmd::List { page } => {
                let request = PageRequest::new(page.page, page.page_size);
                let result = store.page::<Article>(request)?;
                for a in &result.items {
                    println!("{}  {} [{}] {}", a.article_id, a.title, a.category, a.date);
                }
                print_page_footer(&result, request);
            }
            ArticleCmd::Show { article_id } => {
                print_json(&store.get_required::<Article>(&article_id)?.record)?;
            }
            ArticleCmd::Create { article_id, form } => {
                let form: ArticleForm = read_form(&form)?;
                let a = catalog::create_article(&store, &invalidator, &article_id, form)?;
                println!("created article {}", a.article_id);
            }
            ArticleCmd::Update { article_id, form } => {
                let form: ArticleForm = read_form(&form)?;
                let a = catalog::update_article(&store, &invalidator, &article_id, form)?;
                println!("updated article {}", a.article_id);
            }
            ArticleCmd::Delete { article_id } => {
                let cdn = open_cdn(&config)?;
                catalog::delete_article(&store, &cdn, &invalidator, &article_id)?;
                println!("deleted article {article_id}");
            }
        },

        Command::Stats => {
            let s = catalog::stats(&store)?;
            println!("paintings:  {}", s.paintings);
            println!("artists:    {}", s.artists);
            println!("hero items: {}", s.hero_items);
            println!("articles:   {}", s.articles);
        }
    }

    Ok(())
}
