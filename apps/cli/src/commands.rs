//! CLI command definitions, routing, and tracing setup.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use folio_catalog::{Catalog, RefreshPolicy, SearchQuery, SnapshotOrigin};
use folio_content::{ArticleLookup, ContentClient, GraphQlSource};
use folio_shared::{
    AppConfig, ContentConfig, ContentOverrides, init_config, load_config, load_config_from,
};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::output::{self, SearchHit};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Folio: read a headless-CMS blog from the terminal.
#[derive(Parser)]
#[command(
    name = "folio",
    version,
    about = "List, search and read articles from a GraphQL content API.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.folio/folio.toml.
    #[arg(long, env = "FOLIO_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// GraphQL endpoint (overrides env and config).
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Bearer token (overrides env).
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// List every article in the catalog.
    List {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Filter the catalog by title, excerpt, category or tag.
    Search {
        /// Case-insensitive substring to look for.
        query: String,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show one article in full.
    Show {
        /// Article slug.
        slug: String,

        /// Print the article as JSON instead of Markdown.
        #[arg(long)]
        json: bool,
    },

    /// Interactive search over the catalog (one query per line).
    Browse,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "folio=info",
        1 => "folio=debug",
        _ => "folio=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    let overrides = ContentOverrides {
        endpoint: cli.endpoint.clone(),
        token: cli.token.clone(),
    };

    match cli.command {
        Command::List { json } => cmd_list(&config, &overrides, json).await,
        Command::Search { query, json } => cmd_search(&config, &overrides, &query, json).await,
        Command::Show { slug, json } => cmd_show(&config, &overrides, &slug, json).await,
        Command::Browse => cmd_browse(&config, &overrides).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(&config, &overrides).await,
        },
    }
}

fn content_client(
    config: &AppConfig,
    overrides: &ContentOverrides,
) -> Result<ContentClient<GraphQlSource>> {
    let content = ContentConfig::resolve(config, overrides)?;
    debug!(?content, "resolved content config");
    Ok(ContentClient::from_config(&content)?)
}

async fn load_catalog(
    config: &AppConfig,
    overrides: &ContentOverrides,
) -> Result<Catalog<GraphQlSource>> {
    let client = content_client(config, overrides)?;
    let spinner = Spinner::start("Fetching articles");
    let catalog = Catalog::load(client, RefreshPolicy::from(&config.catalog)).await;
    spinner.finish();
    Ok(catalog)
}

// ---------------------------------------------------------------------------
// Spinner
// ---------------------------------------------------------------------------

/// Stderr spinner shown while waiting on the content API.
struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    fn start(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        bar.set_style(style);
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    fn finish(self) {
        self.bar.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_list(config: &AppConfig, overrides: &ContentOverrides, json: bool) -> Result<()> {
    let catalog = load_catalog(config, overrides).await?;
    let snapshot = catalog.snapshot();
    info!(articles = snapshot.len(), "listing catalog");

    if json {
        return output::print_json(snapshot.articles());
    }
    output::print_listing(&snapshot);
    Ok(())
}

async fn cmd_search(
    config: &AppConfig,
    overrides: &ContentOverrides,
    query: &str,
    json: bool,
) -> Result<()> {
    let catalog = load_catalog(config, overrides).await?;
    let snapshot = catalog.snapshot();
    info!(query, "searching catalog");

    if json {
        let parsed = SearchQuery::parse(query);
        let hits: Vec<SearchHit<'_>> = parsed
            .apply(snapshot.articles())
            .into_iter()
            .map(|article| SearchHit {
                article,
                matched: parsed.matched_field(article),
            })
            .collect();
        return output::print_json(&hits);
    }
    output::print_matches(&snapshot, query);
    Ok(())
}

async fn cmd_show(
    config: &AppConfig,
    overrides: &ContentOverrides,
    slug: &str,
    json: bool,
) -> Result<()> {
    let client = content_client(config, overrides)?;
    let spinner = Spinner::start("Fetching article");
    let lookup = client.fetch_article_by_slug(slug).await;
    spinner.finish();

    let article = match lookup {
        ArticleLookup::Found(article) => article,
        ArticleLookup::NotFound => return Err(eyre!("Article not found: {slug}")),
        ArticleLookup::Unavailable { .. } => {
            return Err(eyre!(
                "Article not found: {slug} (the content source could not be reached)"
            ));
        }
    };

    if json {
        return output::print_json(&*article);
    }

    let rendered = folio_markdown::render_article(&article)?;
    print!("{}", rendered.markdown);
    Ok(())
}

async fn cmd_browse(config: &AppConfig, overrides: &ContentOverrides) -> Result<()> {
    let catalog = load_catalog(config, overrides).await?;
    println!(
        "{} articles loaded. Type a query, :refresh to re-fetch, :quit to exit.",
        catalog.snapshot().len()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("search> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match line.trim() {
            ":quit" | ":q" => break,
            ":refresh" => {
                let spinner = Spinner::start("Refreshing");
                let origin = catalog.refresh().await;
                spinner.finish();
                match origin {
                    SnapshotOrigin::Unavailable { .. } => {
                        println!("Refresh failed; the catalog is empty until the next refresh.")
                    }
                    _ => println!("{} articles loaded.", catalog.snapshot().len()),
                }
            }
            _ => {
                if catalog.refresh_if_stale().await {
                    debug!("revalidated stale catalog before filtering");
                }
                output::print_matches(&catalog.snapshot(), &line);
            }
        }
    }

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config: &AppConfig, overrides: &ContentOverrides) -> Result<()> {
    println!("{}", toml::to_string_pretty(config)?);

    match ContentConfig::resolve(config, overrides) {
        Ok(content) => {
            println!("# resolved endpoint: {}", content.endpoint);
            println!(
                "# bearer token: {}",
                if content.token.is_some() { "set" } else { "not set" }
            );
        }
        Err(e) => println!("# {e}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn token_flag_is_global_and_taken_verbatim() {
        let cli = Cli::try_parse_from(["folio", "search", "rust ", "--token", "secret"]).unwrap();
        assert_eq!(cli.token.as_deref(), Some("secret"));
        assert!(matches!(cli.command, Command::Search { ref query, json: false } if query == "rust "));
    }

    #[test]
    fn token_flag_does_not_read_the_environment() {
        let token = Cli::command()
            .get_arguments()
            .find(|arg| arg.get_id() == "token")
            .map(|arg| arg.get_env().is_none());
        assert_eq!(token, Some(true));
    }
}
