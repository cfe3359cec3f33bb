use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use clap::{Parser, Subcommand, ValueEnum};
use freeform::config::{ConfigError, EditorConfig};
use freeform::doc::Document;
use freeform::ingest::IngestError;
use freeform::render::{self, Placement};
use freeform::session::{EditorSession, Variant};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read or write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid document JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("image ingestion failed: {0}")]
    Ingest(#[from] IngestError),
    #[error("session did not produce a saved document")]
    NotSaved,
}

#[derive(Parser, Debug)]
#[command(name = "freeform", about = "Free-form canvas document tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append an image to a document through an editor session.
    Ingest {
        #[arg(long, env = "FREEFORM_DOCUMENT")]
        document: PathBuf,
        #[arg(long)]
        image: PathBuf,
        #[arg(long, value_enum, default_value_t = VariantArg::Officer)]
        variant: VariantArg,
        /// Write the saved document here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print a document's paint order.
    Layers {
        #[arg(long, env = "FREEFORM_DOCUMENT")]
        document: PathBuf,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum VariantArg {
    Officer,
    Public,
}

impl From<VariantArg> for Variant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Officer => Self::Officer,
            VariantArg::Public => Self::Public,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Ingest {
            document,
            image,
            variant,
            output,
        } => run_ingest(&document, &image, variant.into(), output.as_deref()).await,
        Command::Layers { document } => run_layers(&document).await,
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> CliError + '_ {
    move |source| CliError::Io {
        path: path.to_path_buf(),
        source,
    }
}

async fn load_document(path: &Path) -> Result<Document, CliError> {
    let raw = tokio::fs::read_to_string(path).await.map_err(io_error(path))?;
    let doc: Document = serde_json::from_str(&raw)?;
    Ok(Document::from_items(doc.into_items()))
}

async fn run_ingest(
    document: &Path,
    image: &Path,
    variant: Variant,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let config = EditorConfig::from_env()?;
    let doc = load_document(document).await?;
    let (officer, public) = match variant {
        Variant::Officer => (doc, Document::new()),
        Variant::Public => (Document::new(), doc),
    };

    let saved: Rc<RefCell<Option<Document>>> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&saved);
    let mut session = EditorSession::new(
        officer,
        public,
        config,
        move |doc, variant| {
            tracing::debug!(?variant, "save callback received document");
            *sink.borrow_mut() = Some(doc);
        },
        || {},
    );
    session.set_variant(variant);
    session.open();
    let id = session.ingest_file(image).await?;
    session.save();
    session.close();

    let doc = saved.borrow_mut().take().ok_or(CliError::NotSaved)?;
    let rendered = serde_json::to_string_pretty(&doc)?;
    match output {
        Some(path) => {
            tokio::fs::write(path, rendered).await.map_err(io_error(path))?;
            eprintln!("added image {id} to {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

async fn run_layers(document: &Path) -> Result<(), CliError> {
    let doc = load_document(document).await?;
    for painted in render::paint_order(&doc, None) {
        let placement = match painted.placement {
            Placement::Absolute(pt) => format!("at ({}, {})", pt.x, pt.y),
            Placement::Centered => "centered".to_owned(),
        };
        let layer = format!("{:?}", painted.layer);
        let kind = format!("{:?}", painted.element.kind());
        println!("{layer:<10} {} {kind:<8} {placement}", painted.element.id);
    }
    Ok(())
}
