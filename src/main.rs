use art_curator::commands::{Curator, DeleteOutcome};
use art_curator::config::{self, CuratorConfig};
use art_curator::imaging::RustBackend;
use art_curator::layout::StoreLayout;
use art_curator::output;
use art_curator::prompt::ConsolePrompter;
use art_curator::query::{ArtFilter, Finish};
use art_curator::regen::RegenOptions;
use art_curator::store::ArtStore;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "art-curator")]
#[command(version)]
#[command(arg_required_else_help = true)]
#[command(about = "Ingest artwork into a YAML-backed art catalog")]
#[command(long_about = "\
Ingest artwork into a YAML-backed art catalog

Each artwork is one YAML record. Its images are copied into the public asset
tree next to a 300x300 thumbnail, and the record keeps site URLs to both.

Layout (relative to --root):

  content/art/
  ├── characters/<character>/<slug>.yml   # character art
  └── general/<slug>.yml                  # everything else
  public/art/
  ├── characters/<character>/
  │   ├── <image-id>.png                  # original
  │   ├── <image-id>__<variant>.png       # variant of that image
  │   └── thumbnails/<image-id>.webp
  └── general/...

Interactive commands read answers from stdin and prompt on stderr.

Run 'art-curator gen-config' to print a documented art-curator.toml.")]
struct Cli {
    /// Store root containing content/ and public/
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Config file (default: <root>/art-curator.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new art entry from one or more images
    Create {
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// Add images, or variants of the last image, to an entry
    Append {
        slug: String,
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// Attach variant files to a base image
    AddVariants {
        slug: String,
        /// Base image id (or a fragment of its URL). May also be the first variant file.
        image_id: Option<String>,
        variants: Vec<PathBuf>,
    },
    /// Remove an image and its variants from an entry
    RemoveImage {
        slug: String,
        image_id: String,
        /// Also delete the image files
        #[arg(long)]
        files: bool,
    },
    /// Remove one variant, by label or by index
    RemoveVariant {
        slug: String,
        image_id: String,
        label_or_index: String,
        /// Also delete the variant files
        #[arg(long)]
        files: bool,
    },
    /// Edit title, description, tags and flags
    UpdateMeta { slug: String },
    /// Print a record
    Show {
        slug: String,
        #[arg(long)]
        json: bool,
    },
    /// List entries, newest first
    List(ListArgs),
    /// Delete an entry
    Delete {
        slug: String,
        /// Also delete every referenced asset file
        #[arg(long)]
        files: bool,
        /// Don't ask for confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Rebuild thumbnails for every original in the asset tree
    RegenThumbnails {
        /// Only report what would be regenerated
        #[arg(long)]
        dry_run: bool,
        /// Regenerate even when the thumbnail is up to date
        #[arg(long)]
        force: bool,
    },
    /// Print a stock art-curator.toml with all options documented
    GenConfig,
}

#[derive(clap::Args, Debug, Clone, Default)]
struct ListArgs {
    /// Only pinned entries
    #[arg(long)]
    pinned: bool,
    /// Only sketches
    #[arg(long, conflicts_with = "finished")]
    sketch: bool,
    /// Only finished pieces
    #[arg(long)]
    finished: bool,
    /// Owned by or featuring this character
    #[arg(long)]
    character: Option<String>,
    #[arg(long)]
    tag: Option<String>,
    #[arg(long)]
    artist: Option<String>,
    /// Search title and description
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    limit: Option<usize>,
    #[arg(long)]
    json: bool,
}

impl ListArgs {
    fn filter(&self) -> ArtFilter {
        let finish = if self.sketch {
            Some(Finish::Sketch)
        } else if self.finished {
            Some(Finish::Finished)
        } else {
            None
        };
        ArtFilter {
            pinned_only: self.pinned,
            finish,
            character: self.character.clone(),
            tag: self.tag.clone(),
            artist: self.artist.clone(),
            search: self.search.clone(),
            limit: self.limit,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if is_clean_exit(e.kind()) {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            };
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Help and version requests, including the help shown for a bare
/// invocation, are successful exits.
fn is_clean_exit(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if matches!(cli.command, Command::GenConfig) {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = config::load_config(&cli.root, cli.config.as_deref())?;
    let mut curator = curator(&cli.root, &config);

    match cli.command {
        Command::Create { images } => {
            let found = curator.create(&images)?;
            output::print_entry(&found.entry);
        }
        Command::Append { slug, images } => {
            let found = curator.append(&slug, &images)?;
            output::print_entry(&found.entry);
        }
        Command::AddVariants {
            slug,
            image_id,
            variants,
        } => {
            let found = curator.add_variants(&slug, image_id.as_deref(), &variants)?;
            output::print_entry(&found.entry);
        }
        Command::RemoveImage {
            slug,
            image_id,
            files,
        } => {
            let (found, report) = curator.remove_image(&slug, &image_id, files)?;
            output::print_entry(&found.entry);
            output::print_deletion_report(&report);
        }
        Command::RemoveVariant {
            slug,
            image_id,
            label_or_index,
            files,
        } => {
            let (found, report) =
                curator.remove_variant(&slug, &image_id, &label_or_index, files)?;
            output::print_entry(&found.entry);
            output::print_deletion_report(&report);
        }
        Command::UpdateMeta { slug } => {
            let found = curator.update_meta(&slug)?;
            output::print_entry(&found.entry);
        }
        Command::Show { slug, json } => {
            let found = curator.show(&slug)?;
            let text = output::format_record(&found.entry, json)?;
            println!("{}", text.trim_end());
        }
        Command::List(args) => {
            let records = curator.list(&args.filter());
            if args.json {
                println!("{}", output::format_list_json(&records)?);
            } else {
                output::print_list(&records, curator.store().layout().content_dir());
            }
        }
        Command::Delete { slug, files, yes } => match curator.delete(&slug, files, yes)? {
            DeleteOutcome::Deleted(report) => {
                println!("Deleted {slug}");
                output::print_deletion_report(&report);
            }
            DeleteOutcome::Declined => println!("Aborted."),
        },
        Command::RegenThumbnails { dry_run, force } => {
            let report = curator.regen_thumbnails(RegenOptions { dry_run, force });
            output::print_regen_report(&report, dry_run);
        }
        Command::GenConfig => {}
    }

    Ok(())
}

fn curator(
    root: &std::path::Path,
    config: &CuratorConfig,
) -> Curator<RustBackend, ConsolePrompter<std::io::StdinLock<'static>, std::io::Stderr>> {
    let store = ArtStore::new(StoreLayout::new(root, config));
    Curator::new(
        store,
        RustBackend::new(),
        ConsolePrompter::stdio(),
        config.thumbnail_config(),
    )
}
