use std::error::Error as StdError;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::warn;

use plan_doc::docx::{read_document, DecodedBlock, DecodedDocument, DocxSerializer};
use plan_doc::model::ListFormat;
use plan_doc::outline::Outline;
use plan_doc::pdf::PdfSerializer;
use plan_doc::summary::{self, TaskCounts};
use plan_doc::{write_document, OutputFormat, Serializer, Theme};

/// Renders the project plan and inspects generated documents.
///
/// PDF output needs TrueType fonts under `assets/fonts` (or `PLAN_DOC_FONTS_DIR`); DOCX output has
/// no such requirement.
#[derive(Parser)]
#[command(name = "plan-doc", version, about = "Assemble project plan documents")]
struct Cli {
    /// Log debug output (RUST_LOG overrides this).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the document described by an outline and write it to disk.
    Render(RenderArgs),

    /// Print the blocks of a generated `.docx` file.
    Inspect {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Print task counts per section of an outline.
    Stats {
        /// Outline TOML file (defaults to the bundled plan).
        #[arg(long, value_name = "FILE")]
        outline: Option<PathBuf>,
    },
}

#[derive(Args)]
struct RenderArgs {
    /// Outline TOML file (defaults to the bundled plan).
    #[arg(long, value_name = "FILE")]
    outline: Option<PathBuf>,

    /// Theme TOML file overriding colors, fonts and sizes.
    #[arg(long, value_name = "FILE")]
    theme: Option<PathBuf>,

    /// Output path.
    #[arg(short, long, value_name = "PATH", default_value = "project_plan.docx")]
    output: PathBuf,

    /// Output format (inferred from the output extension when omitted).
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Print page numbers in the PDF footer.
    #[arg(long)]
    page_numbers: bool,

    /// Add a PDF outline entry for every level 1 heading.
    #[arg(long)]
    bookmarks: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Pdf,
    Docx,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Pdf => OutputFormat::Pdf,
            FormatArg::Docx => OutputFormat::Docx,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Render(args) => cmd_render(&args),
        Commands::Inspect { input } => cmd_inspect(&input),
        Commands::Stats { outline } => cmd_stats(outline.as_deref()),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(&err);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn print_error_sources(mut error: &(dyn StdError + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}

fn load_outline(path: Option<&Path>) -> plan_doc::Result<Outline> {
    match path {
        Some(path) => Outline::from_toml_str(&fs::read_to_string(path)?),
        None => Outline::bundled(),
    }
}

fn load_theme(path: Option<&Path>) -> plan_doc::Result<Theme> {
    match path {
        Some(path) => Theme::from_toml_str(&fs::read_to_string(path)?),
        None => Ok(Theme::default()),
    }
}

fn pdf_serializer(args: &RenderArgs) -> PdfSerializer {
    let serializer = PdfSerializer::new().with_page_numbers(args.page_numbers);

    #[cfg(feature = "bookmarks")]
    let serializer = serializer.with_bookmarks(args.bookmarks);
    #[cfg(not(feature = "bookmarks"))]
    if args.bookmarks {
        warn!("plan-doc was built without the `bookmarks` feature; ignoring --bookmarks");
    }

    serializer
}

fn cmd_render(args: &RenderArgs) -> plan_doc::Result<()> {
    let theme = load_theme(args.theme.as_deref())?;
    let outline = load_outline(args.outline.as_deref())?;
    let document = outline.build(theme)?;

    let format = match args.format {
        Some(format) => {
            let format = OutputFormat::from(format);
            if let Some(implied) = conflicting_extension(format, &args.output) {
                warn!(
                    "Writing {} output to {} although its extension implies {}",
                    format,
                    args.output.display(),
                    implied
                );
            }
            format
        }
        None => OutputFormat::from_path(&args.output)?,
    };

    let serializer: Box<dyn Serializer> = match format {
        OutputFormat::Pdf => Box::new(pdf_serializer(args)),
        OutputFormat::Docx => {
            if args.page_numbers || args.bookmarks {
                warn!("--page-numbers and --bookmarks only apply to PDF output");
            }
            Box::new(DocxSerializer::new())
        }
    };

    let written = write_document(&document, serializer.as_ref(), &args.output)?;
    println!("Generated {} ({} bytes)", args.output.display(), written);
    Ok(())
}

/// The format implied by `path`'s extension when it differs from `format`.
fn conflicting_extension(format: OutputFormat, path: &Path) -> Option<OutputFormat> {
    OutputFormat::from_path(path)
        .ok()
        .filter(|implied| *implied != format)
}

fn cmd_inspect(input: &Path) -> plan_doc::Result<()> {
    let bytes = fs::read(input)?;
    let decoded = read_document(&bytes)?;

    if !decoded.title.is_empty() {
        println!("Title: {}", decoded.title);
    }
    for (index, block) in decoded.blocks.iter().enumerate() {
        println!("{:>4}  {}", index + 1, describe(&decoded, block));
    }
    Ok(())
}

fn describe(decoded: &DecodedDocument, block: &DecodedBlock) -> String {
    let mut tags = Vec::new();
    if let Some(style) = &block.style_id {
        tags.push(style.clone());
    }
    if let Some(num_id) = block.num_id {
        let list = match decoded.list_format(num_id) {
            Some(ListFormat::Bullet) => "bullet",
            Some(ListFormat::Decimal) => "numbered",
            None => "list",
        };
        tags.push(list.to_string());
    }
    if let Some(color) = block.left_border {
        tags.push(format!("bar {}", color));
    }
    if let Some(color) = block.bottom_border {
        tags.push(format!("rule {}", color));
    }

    let text = block.text();
    let text = if text.is_empty() { "(empty)".to_string() } else { text };
    if tags.is_empty() {
        text
    } else {
        format!("[{}] {}", tags.join(", "), text)
    }
}

fn cmd_stats(outline: Option<&Path>) -> plan_doc::Result<()> {
    let document = load_outline(outline)?.build(Theme::default())?;
    let sections = summary::tally_sections(document.blocks());

    let width = sections
        .iter()
        .map(|section| section.title.chars().count())
        .max()
        .unwrap_or(0);
    for section in &sections {
        println!("{:<width$}  {}", section.title, counts(&section.counts), width = width);
    }
    println!(
        "{:<width$}  {}",
        "Total",
        counts(&summary::overall(&sections)),
        width = width
    );
    Ok(())
}

fn counts(counts: &TaskCounts) -> String {
    format!(
        "{:>3} done  {:>3} todo  {:>3} skip  ({} total, {})",
        counts.done,
        counts.todo,
        counts.skip,
        counts.total(),
        counts.progress()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_format_that_contradicts_extension() {
        assert_eq!(
            conflicting_extension(OutputFormat::Pdf, Path::new("plan.docx")),
            Some(OutputFormat::Docx)
        );
        assert_eq!(conflicting_extension(OutputFormat::Pdf, Path::new("plan.pdf")), None);
        assert_eq!(conflicting_extension(OutputFormat::Docx, Path::new("plan")), None);
    }
}
