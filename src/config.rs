//! Build configuration.
//!
//! Options come from three places, most specific first: command line flags, an optional
//! `book.toml` in the chapter directory, and built-in defaults. They are merged once into an
//! immutable [`BuildOptions`] which the rest of the pipeline only reads.

use crate::cli::Cli;
use crate::language::DEFAULT_LANGUAGE;
use crate::sinks::pdf::PDF;
use anyhow::{anyhow, Context, Result};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Base name of the output files unless configured otherwise.
pub const DEFAULT_OUTPUT_NAME: &str = "book_output";

/// File name of the optional configuration file.
pub const CONFIG_FILE: &str = "book.toml";

/// Everything that decides what gets built.
#[derive(Builder, Debug, Clone)]
#[builder(setter(into))]
pub struct BuildOptions {
    directory: PathBuf,
    #[builder(setter(into, strip_option), default)]
    title: Option<String>,
    #[builder(setter(into, strip_option), default)]
    author: Option<String>,
    #[builder(setter(into, strip_option), default)]
    cover: Option<PathBuf>,
    #[builder(setter(into, strip_option), default)]
    epub_cover: Option<PathBuf>,
    #[builder(default = "DEFAULT_LANGUAGE.to_string()")]
    language: String,
    #[builder(default)]
    epub: bool,
    #[builder(default = "DEFAULT_OUTPUT_NAME.to_string()")]
    output_name: String,
    #[builder(default = "true")]
    front_matter: bool,
}

impl BuildOptions {
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn cover(&self) -> Option<&Path> {
        self.cover.as_deref()
    }

    /// The cover used by the EPUB: its own if configured, otherwise the main cover.
    pub fn epub_cover(&self) -> Option<&Path> {
        self.epub_cover.as_deref().or(self.cover.as_deref())
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn epub(&self) -> bool {
        self.epub
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    pub fn front_matter(&self) -> bool {
        self.front_matter
    }

    /// Where the output with the given extension is written.
    pub fn output_path(&self, extension: &str) -> PathBuf {
        self.directory
            .join(format!("{}.{}", self.output_name, extension))
    }
}

/// The `[book]` table of `book.toml`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BookConfig {
    pub title: Option<String>,
    pub author: Option<String>,
    /// Relative paths are resolved against the chapter directory
    pub cover: Option<PathBuf>,
    pub epub_cover: Option<PathBuf>,
    pub language: Option<String>,
    pub epub: Option<bool>,
    pub output: Option<String>,
    pub front_matter: Option<bool>,
}

/// Contents of `book.toml`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Configuration {
    pub book: BookConfig,
    pub pdf: PDF,
}

impl Configuration {
    pub fn load(path: &Path) -> Result<Configuration> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to load {} contents", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Load the explicitly given file, or `book.toml` in `directory` if there is one.
    pub fn discover(directory: &Path, explicit: Option<&Path>) -> Result<Configuration> {
        match explicit {
            Some(path) => Configuration::load(path),
            None => {
                let path = directory.join(CONFIG_FILE);
                if path.is_file() {
                    log::info!("using configuration from {}", path.display());
                    Configuration::load(&path)
                } else {
                    Ok(Configuration::default())
                }
            }
        }
    }

    /// Merge command line flags over the file's values.
    pub fn build_options(&self, cli: &Cli) -> Result<BuildOptions> {
        let book = &self.book;
        let directory = &cli.directory;
        let mut builder = BuildOptionsBuilder::default();
        builder.directory(directory.clone());

        if let Some(title) = cli.title.clone().or_else(|| book.title.clone()) {
            builder.title(title);
        }
        if let Some(author) = cli.author.clone().or_else(|| book.author.clone()) {
            builder.author(author);
        }
        if let Some(cover) = cli
            .cover
            .clone()
            .or_else(|| book.cover.as_ref().map(|p| directory.join(p)))
        {
            builder.cover(cover);
        }
        if let Some(cover) = cli
            .epub_cover
            .clone()
            .or_else(|| book.epub_cover.as_ref().map(|p| directory.join(p)))
        {
            builder.epub_cover(cover);
        }
        if let Some(language) = cli.language.clone().or_else(|| book.language.clone()) {
            builder.language(language);
        }
        if let Some(output) = cli.output.clone().or_else(|| book.output.clone()) {
            builder.output_name(output);
        }
        builder.epub(cli.epub || book.epub.unwrap_or(false));
        builder.front_matter(!cli.no_front_matter && book.front_matter.unwrap_or(true));

        builder
            .build()
            .map_err(|e| anyhow!("Invalid build options: {e}"))
    }

    /// The PDF settings with command line overrides applied.
    pub fn pdf(&self, cli: &Cli) -> PDF {
        let mut pdf = self.pdf.clone();
        if let Some(font) = &cli.font {
            pdf.font = Some(font.clone());
        }
        pdf
    }
}
