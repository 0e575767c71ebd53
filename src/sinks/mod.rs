use crate::document::ContentTree;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub mod epub;
pub use epub::EpubPackager;

pub mod pdf;
pub use pdf::PdfRenderer;

/// An output format for a finished content tree.
pub trait Render: Sync {
    /// File extension of the output, which is also how it's named in messages.
    fn extension(&self) -> &'static str;

    fn render(&self, tree: &ContentTree) -> Result<Vec<u8>>;
}

/// A rendered book waiting to be written out.
#[derive(Debug)]
pub struct Output {
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

/// Render `tree` with every sink, each on its own thread.
///
/// Nothing is written here; if any sink fails the others' work is discarded.
pub fn render_all(sinks: &[&dyn Render], tree: &ContentTree) -> Result<Vec<Output>> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = sinks
            .iter()
            .map(|sink| (sink.extension(), scope.spawn(move || sink.render(tree))))
            .collect();

        handles
            .into_iter()
            .map(|(extension, handle)| {
                let bytes = handle
                    .join()
                    .map_err(|_| anyhow!("The {extension} renderer panicked"))?
                    .with_context(|| format!("Failed to render {extension}"))?;
                Ok(Output { extension, bytes })
            })
            .collect()
    })
}

/// A finished output sitting in a temporary file beside its destination.
struct Staged {
    file: NamedTempFile,
    path: PathBuf,
}

fn stage(path: &Path, bytes: &[u8]) -> Result<Staged> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(directory).with_context(|| {
        format!("Failed to create temporary file in {}", directory.display())
    })?;
    file.write_all(bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.as_file()
        .sync_all()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(Staged {
        file,
        path: path.to_path_buf(),
    })
}

/// Write every output, or none of them.
///
/// All files are written to temporary files first and only then renamed into place. If a
/// rename fails, the outputs already moved are put back the way they were.
pub fn write_atomically(outputs: &[(PathBuf, &[u8])]) -> Result<Vec<PathBuf>> {
    let staged = outputs
        .iter()
        .map(|(path, bytes)| stage(path, bytes))
        .collect::<Result<Vec<Staged>>>()?;
    let previous: Vec<Option<Vec<u8>>> = staged
        .iter()
        .map(|staged| fs::read(&staged.path).ok())
        .collect();

    let mut written = Vec::with_capacity(staged.len());
    for Staged { file, path } in staged {
        if let Err(e) = file.persist(&path) {
            roll_back(&written, &previous);
            return Err(e.error)
                .with_context(|| format!("Failed to move output into place at {}", path.display()));
        }
        written.push(path);
    }
    Ok(written)
}

fn roll_back(written: &[PathBuf], previous: &[Option<Vec<u8>>]) {
    for (path, previous) in written.iter().zip(previous) {
        let restored = match previous {
            Some(bytes) => stage(path, bytes).and_then(|staged| {
                staged
                    .file
                    .persist(&staged.path)
                    .map(|_| ())
                    .map_err(|e| anyhow::Error::from(e.error))
            }),
            None => fs::remove_file(path).map_err(anyhow::Error::from),
        };
        if let Err(e) = restored {
            log::warn!("could not restore {}: {e:#}", path.display());
        }
    }
}
