use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Cli {
    /// Directory containing chapter_*.md files (and optionally front_matter.md)
    pub directory: PathBuf,

    /// Book title for the title page
    #[clap(long)]
    pub title: Option<String>,

    /// Author name for the title page
    #[clap(long)]
    pub author: Option<String>,

    /// Cover image (PNG or JPEG), placed on its own page before the title page
    #[clap(long)]
    pub cover: Option<PathBuf>,

    /// Cover image to use for the EPUB only (defaults to --cover)
    #[clap(long)]
    pub epub_cover: Option<PathBuf>,

    /// Language code used to localise chapter headings (default: en)
    #[clap(long = "lang", env = "BINDERY_LANG")]
    pub language: Option<String>,

    /// Also generate an EPUB alongside the PDF
    #[clap(long)]
    pub epub: bool,

    /// Base name for the output files (default: book_output)
    #[clap(long)]
    pub output: Option<String>,

    /// Font family base path (e.g. ./fonts/MyFont for MyFont-Regular.ttf, MyFont-Bold.ttf, ...)
    #[clap(long)]
    pub font: Option<String>,

    /// Configuration file (default: book.toml in the chapter directory, if present)
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Ignore front_matter.md even if it exists
    #[clap(long)]
    pub no_front_matter: bool,

    /// Log more detail (-v for info, -vv for debug)
    #[clap(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
