use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use spdlog::{info, warn};

use vibewrite::api::client::ApiClient;
use vibewrite::api::types::BlogSummary;
use vibewrite::config::Config;
use vibewrite::document::{Category, ContentDocument, DraftStore};
use vibewrite::editor::actions::FormatAction;
use vibewrite::editor::apply_action;
use vibewrite::editor::session::EditorSession;
use vibewrite::editor::text_ops::Selection;
use vibewrite::listing::query_state::parse_tags;
use vibewrite::listing::{trending_score, ListingController, SortOrder, TrendingRange, TrendingView};
use vibewrite::logger::configure_logger;
use vibewrite::moderation::ModerationBoard;
use vibewrite::notify::{NoticeLevel, Notifications};
use vibewrite::preview;
use vibewrite::preview::page::PagePreview;
use vibewrite::session::{Session, TokenStore};
use vibewrite::text_utils::format_date_time;

use crate::config::open_config;

mod config;

const CFG_FILE_NAME: &str = "vibewrite.toml";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config path
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Signs in and keeps the session for later commands
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Ends the current session
    Logout,
    /// Shows who is signed in
    Whoami,
    /// Lists published blogs
    List(ListArgs),
    /// Shows the trending blogs of the last days
    Trending {
        /// 7, 14 or 30
        #[arg(short, long)]
        days: Option<TrendingRange>,
    },
    /// Renders a markdown file as a standalone HTML preview
    Preview(PreviewArgs),
    /// Applies a toolbar action to a markdown file
    Format(FormatArgs),
    /// Sends a markdown file to the platform
    #[command(subcommand)]
    Draft(DraftCommand),
    /// Moderation, admin accounts only
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Args, Debug)]
struct ListArgs {
    /// URL query to start from, e.g. "search=rust&sort=popular"
    #[arg(long)]
    query: Option<String>,
    #[arg(long)]
    search: Option<String>,
    /// Category name, "all" for every category
    #[arg(long)]
    category: Option<String>,
    /// Comma separated tags
    #[arg(long)]
    tags: Option<String>,
    #[arg(long)]
    sort: Option<SortOrder>,
    /// How many pages to load
    #[arg(long, default_value_t = 1)]
    pages: u32,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    file: PathBuf,
    #[arg(short, long, default_value = "")]
    title: String,
    /// Comma separated tags
    #[arg(long)]
    tags: Option<String>,
}

#[derive(Args, Debug)]
struct FormatArgs {
    file: PathBuf,
    /// bold, italic, code, h1, h2, h3, ul, ol, quote, link or image
    #[arg(short, long)]
    action: FormatAction,
    /// Selection start, in characters
    #[arg(long, default_value_t = 0)]
    start: usize,
    /// Selection end, in characters. Defaults to the start
    #[arg(long)]
    end: Option<usize>,
    /// Rewrite the file instead of printing the result
    #[arg(long)]
    in_place: bool,
}

#[derive(Args, Debug)]
struct DraftArgs {
    file: PathBuf,
    #[arg(short, long)]
    title: String,
    #[arg(long)]
    category: Option<Category>,
    /// Comma separated tags
    #[arg(long)]
    tags: Option<String>,
}

#[derive(Subcommand, Debug)]
enum DraftCommand {
    /// Saves the file as a draft
    Save(DraftArgs),
    /// Submits the file for review
    Publish(DraftArgs),
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// Dashboard counters and the review queue
    Pending,
    Approve { id: String },
    Reject {
        id: String,
        #[arg(short, long)]
        reason: String,
    },
    /// Toggles the visibility of a blog
    Hide { id: String },
    Delete {
        id: String,
        /// Must be DELETE
        #[arg(long)]
        confirm: String,
    },
}

/// Prints and forgets the pending notices. Returns false if any was an error.
fn report(notifications: &mut Notifications) -> bool {
    let mut ok = true;
    for notice in notifications.drain() {
        if notice.level == NoticeLevel::Error {
            ok = false;
            eprintln!("{}", notice);
        } else {
            println!("{}", notice);
        }
    }
    ok
}

fn print_blog(blog: &BlogSummary, score: u64) {
    let (date, _) = format_date_time(&blog.effective_instant());
    let hidden = if blog.is_hidden { " [hidden]" } else { "" };
    println!(
        "{:>5}  {}  {} by {} ({} likes, {} comments, {} views){}",
        score,
        date,
        blog.title,
        blog.author.display_name(),
        blog.like_count,
        blog.comment_count,
        blog.views,
        hidden
    );
}

fn preview_cmd(args: PreviewArgs) -> Result<()> {
    let body = fs::read_to_string(&args.file).with_context(|| format!("Could not read {}", args.file.display()))?;
    let tags = args.tags.as_deref().map(parse_tags).unwrap_or_default();
    let tree = preview::render(&args.title, &body, tags.iter().map(String::as_str));
    let page = PagePreview::new()?;
    println!("{}", page.render(&tree));
    Ok(())
}

fn format_cmd(args: FormatArgs) -> Result<()> {
    let body = fs::read_to_string(&args.file).with_context(|| format!("Could not read {}", args.file.display()))?;
    let selection = Selection::new(args.start, args.end.unwrap_or(args.start)).clamp(body.chars().count());
    let edit = apply_action(&body, selection, args.action);

    if args.in_place {
        fs::write(&args.file, &edit.body).with_context(|| format!("Could not write {}", args.file.display()))?;
    } else {
        print!("{}", edit.body);
    }
    eprintln!("selection: {}..{}", edit.selection.start, edit.selection.end);
    Ok(())
}

async fn list_cmd(config: &Config, api: &ApiClient, args: ListArgs) -> Result<()> {
    let url_query = args.query.unwrap_or_default();
    let (mut listing, _committed) =
        ListingController::new(&url_query, config.defaults.page_size, config.defaults.search_debounce());

    let mut ticket = None;
    if let Some(search) = args.search {
        ticket = listing.commit_search(&search).or(ticket);
    }
    if let Some(category) = args.category {
        ticket = listing.set_category(Some(&category)).or(ticket);
    }
    for tag in args.tags.as_deref().map(parse_tags).unwrap_or_default() {
        if !listing.query().tags.contains(&tag) {
            ticket = listing.toggle_tag(&tag).or(ticket);
        }
    }
    if let Some(sort) = args.sort {
        ticket = listing.set_sort(sort).or(ticket);
    }

    let ticket = match ticket {
        Some(ticket) => ticket,
        None => listing.begin_reset(),
    };
    listing.run(api, ticket).await;
    for _ in 1..args.pages {
        if !listing.load_more(api).await {
            break;
        }
    }

    let url = listing.url_query();
    println!("?{}  ({} active filters)", url, listing.active_filter_count());
    let now = Utc::now();
    for blog in listing.blogs() {
        print_blog(blog, trending_score(blog, now));
    }
    println!("{} of {} loaded, {} more", listing.blogs().len(), listing.total(), listing.remaining());

    let tags: Vec<_> = listing.facets().collect();
    if !tags.is_empty() {
        println!("tags: {}", tags.join(", "));
    }

    if !report(&mut listing.notifications) {
        bail!("Listing failed");
    }
    Ok(())
}

async fn trending_cmd(config: &Config, api: &ApiClient, days: Option<TrendingRange>) -> Result<()> {
    let range = days.unwrap_or_else(|| config.defaults.trending_range());
    let mut view = TrendingView::new(range, config.defaults.trending_limit);
    view.load(api).await;

    println!("Trending in the last {}", view.range());
    for ranked in view.ranked(Utc::now()) {
        print!("#{:<3}", ranked.rank);
        print_blog(ranked.blog, ranked.score);
    }

    if !report(&mut view.notifications) {
        bail!("Loading trending blogs failed");
    }
    Ok(())
}

async fn draft_cmd(config: &Config, session: &Session, command: DraftCommand) -> Result<()> {
    let (args, publish) = match command {
        DraftCommand::Save(args) => (args, false),
        DraftCommand::Publish(args) => (args, true),
    };
    let body = fs::read_to_string(&args.file).with_context(|| format!("Could not read {}", args.file.display()))?;

    let mut editor = EditorSession::with_store(DraftStore::new(&config.data_dir()));
    let mut document = ContentDocument::new(&args.title, &body);
    document.category = args.category;
    for tag in args.tags.as_deref().map(parse_tags).unwrap_or_default() {
        document.tags.insert(&tag);
    }
    editor.document = document;

    let stats = editor.stats();
    info!("{} words, {} min read", stats.words, stats.read_time_minutes);

    let blog = if publish {
        editor.publish(session.api()).await
    } else {
        editor.save_draft(session.api()).await
    };
    if let Some(blog) = blog {
        println!("{} ({})", blog.slug, blog.status.as_str());
    }

    if !report(&mut editor.notifications) {
        bail!("Could not send {}", args.file.display());
    }
    Ok(())
}

async fn admin_cmd(config: &Config, session: &Session, command: AdminCommand) -> Result<()> {
    let api = session.api();
    let mut board = ModerationBoard::new(config.defaults.pending_page_size);

    match command {
        AdminCommand::Pending => {
            board.load_dashboard(api).await;
            let blogs = board.stats().blogs;
            println!(
                "blogs: {} total, {} published, {} pending, {} rejected",
                blogs.total, blogs.published, blogs.pending, blogs.rejected
            );
            println!("users: {}, comments: {}", board.stats().users.total, board.stats().comments.total);
            for blog in board.pending() {
                println!("{}  {} by {}", blog.id, blog.title, blog.author.display_name());
            }
            for item in board.recent_activity() {
                println!("{}  {} {}", item.at.format("%Y-%m-%d"), item.name, item.action);
            }
            for category in &board.stats().analytics.blogs_by_category {
                println!("{}: {}", category.category, category.count);
            }
        }
        AdminCommand::Approve { id } => {
            board.approve(api, &id).await;
        }
        AdminCommand::Reject { id, reason } => {
            board.reject(api, &id, &reason).await;
        }
        AdminCommand::Hide { id } => {
            board.toggle_hide(api, &id).await;
        }
        AdminCommand::Delete { id, confirm } => {
            board.delete(api, &id, &confirm).await;
        }
    }

    if !report(&mut board.notifications) {
        bail!("Moderation request failed");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Local commands, no configuration needed
    let command = match cli.command {
        Command::Preview(args) => return preview_cmd(args),
        Command::Format(args) => return format_cmd(args),
        command => command,
    };

    let config = match open_config(cli.config_path.map(PathBuf::from)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("Please run vibewrite --help");
            return Ok(());
        }
    };

    if let Err(err) = configure_logger(config.log.as_ref()) {
        warn!("Error creating logger sinks. Using console instead. Desc={}", err);
    }

    info!("Starting VibeWrite client for {}", config.api.base_url);

    let api = ApiClient::new(&config.api.base_url, config.api.timeout())?;
    let mut session = Session::new(api, TokenStore::new(&config.data_dir()));

    match command {
        Command::Login { email, password } => {
            session.login(&email, &password).await;
            if !report(&mut session.notifications) {
                bail!("Login failed");
            }
        }
        Command::Logout => {
            session.restore().await;
            session.logout().await;
            report(&mut session.notifications);
        }
        Command::Whoami => {
            if !session.restore().await {
                bail!("Not signed in");
            }
            if let Some(user) = session.user() {
                println!("{} <{}> {:?}", user.username, user.email, user.role);
            }
        }
        Command::List(args) => {
            session.restore().await;
            list_cmd(&config, session.api(), args).await?;
        }
        Command::Trending { days } => {
            session.restore().await;
            trending_cmd(&config, session.api(), days).await?;
        }
        Command::Draft(command) => {
            if !session.restore().await {
                bail!("Not signed in, run vibewrite login first");
            }
            draft_cmd(&config, &session, command).await?;
        }
        Command::Admin(command) => {
            if !session.restore().await || !session.is_admin() {
                bail!("An admin session is required, run vibewrite login first");
            }
            admin_cmd(&config, &session, command).await?;
        }
        Command::Preview(_) | Command::Format(_) => {}
    }

    Ok(())
}
