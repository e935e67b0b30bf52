use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tvdb_scraper::model::{
    EpisodeNumber, EpisodeOrder, MediaArtworkType, MediaScrapeOptions, MediaSearchOptions,
    MediaType,
};
use tvdb_scraper::provider::TvShowArtworkProvider;
use tvdb_scraper::{
    ScraperConfig, TvShowMetadataProvider, TvdbClient, connect_provider, document_fetcher,
};

#[derive(Parser)]
#[command(name = "tvdb-scraper")]
#[command(author, version, about = "Look up TV show metadata and artwork on TheTVDB")]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Language for lookups (defaults to the configured language)
    #[arg(short, long, global = true)]
    language: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search TV shows by name
    Search {
        query: String,

        /// Year the show first aired, used to rank results
        #[arg(long)]
        year: Option<i32>,
    },

    /// Show metadata of a TV show
    Show {
        /// TheTVDB series id
        id: String,
    },

    /// Show metadata of a single episode
    Episode {
        /// TheTVDB series id
        id: String,

        #[arg(long, requires = "episode")]
        season: Option<u32>,

        #[arg(long, requires = "season")]
        episode: Option<u32>,

        /// Interpret season and episode in DVD order
        #[arg(long)]
        dvd: bool,

        /// Air date (YYYY-MM-DD), used when no number is given or it finds nothing
        #[arg(long)]
        aired: Option<NaiveDate>,
    },

    /// List all episodes of a TV show
    Episodes {
        /// TheTVDB series id
        id: String,
    },

    /// List artwork of a TV show
    Artwork {
        /// TheTVDB series id
        id: String,

        #[arg(long, value_enum, default_value_t = ArtworkKind::All)]
        kind: ArtworkKind,
    },

    /// List the languages TheTVDB offers
    Languages,

    /// Fetch a legacy XML document
    Document {
        url: String,

        /// Print only the value of this element
        #[arg(long)]
        element: Option<String>,

        /// Append a child element to the root, as NAME=VALUE (repeatable)
        #[arg(long = "append", value_parser = parse_child)]
        append: Vec<(String, String)>,

        /// Write the document to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ArtworkKind {
    All,
    Background,
    Banner,
    Poster,
    Season,
}

impl From<ArtworkKind> for MediaArtworkType {
    fn from(kind: ArtworkKind) -> Self {
        match kind {
            ArtworkKind::All => MediaArtworkType::All,
            ArtworkKind::Background => MediaArtworkType::Background,
            ArtworkKind::Banner => MediaArtworkType::Banner,
            ArtworkKind::Poster => MediaArtworkType::Poster,
            ArtworkKind::Season => MediaArtworkType::Season,
        }
    }
}

fn parse_child(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((name, text)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), text.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{value}'")),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn scrape_options(media_type: MediaType, id: String, language: &str) -> MediaScrapeOptions {
    let mut options = MediaScrapeOptions::new(media_type);
    options.set_id("tvdb", id);
    options.language = language.to_string();
    options
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = ScraperConfig::load(cli.config.as_deref())?;
    let language = cli.language.unwrap_or_else(|| config.language.clone());
    debug!(language = %language, "configuration loaded");

    match cli.command {
        Commands::Search { query, year } => {
            let provider = connect_provider(&config)?;
            let mut options = MediaSearchOptions::new(MediaType::TvShow, query);
            options.language = language;
            options.year = year;
            print_json(&provider.search(&options)?)
        }
        Commands::Show { id } => {
            let provider = connect_provider(&config)?;
            let options = scrape_options(MediaType::TvShow, id, &language);
            print_json(&provider.get_metadata(&options)?)
        }
        Commands::Episode {
            id,
            season,
            episode,
            dvd,
            aired,
        } => {
            let provider = connect_provider(&config)?;
            let mut options = scrape_options(MediaType::TvEpisode, id, &language);
            options.episode = season.zip(episode).map(|(season, episode)| EpisodeNumber {
                season,
                episode,
                order: if dvd {
                    EpisodeOrder::Dvd
                } else {
                    EpisodeOrder::Aired
                },
            });
            options.release_date = aired;
            print_json(&provider.get_metadata(&options)?)
        }
        Commands::Episodes { id } => {
            let provider = connect_provider(&config)?;
            let options = scrape_options(MediaType::TvShow, id, &language);
            print_json(&provider.get_episode_list(&options)?)
        }
        Commands::Artwork { id, kind } => {
            let provider = connect_provider(&config)?;
            let mut options = scrape_options(MediaType::TvShow, id, &language);
            options.artwork_type = kind.into();
            print_json(&provider.get_artwork(&options)?)
        }
        Commands::Languages => {
            let client = TvdbClient::connect(&config)?;
            print_json(&client.known_languages())
        }
        Commands::Document {
            url,
            element,
            append,
            output,
        } => {
            let fetcher = document_fetcher(&config)?;
            let mut document = fetcher.fetch_document(&url)?;
            for (name, text) in &append {
                document.root_mut().append_child(name, text);
            }

            if let Some(tag) = element {
                println!("{}", document.value_from_element(&tag));
                return Ok(());
            }

            match output {
                Some(path) if document.write_to_file(&path) => {
                    eprintln!("Document written to {}", path.display());
                    Ok(())
                }
                Some(path) => Err(format!("could not write {}", path.display()).into()),
                None => {
                    println!("{}", document.to_xml_string()?);
                    Ok(())
                }
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "tvdb_scraper=debug"
    } else {
        "tvdb_scraper=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
