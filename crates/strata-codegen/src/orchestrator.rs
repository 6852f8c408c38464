//! Walks a document once per target and writes the resulting file sets.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, trace};
use rayon::prelude::*;
use strata_core::{Document, Node};
use strata_model::{DecodedDocument, ModelBuilder};

use crate::error::{CodegenError, Result};
use crate::generators::{Backend, FileSet, ReactNativeBackend, SwiftUiBackend, Target};
use crate::options::ExportOptions;

type EmitFn = fn(&Document, &ExportOptions) -> Result<FileSet>;

/// Emitters for every supported target.
static EMITTERS: [(Target, EmitFn); 2] = [
    (Target::SwiftUi, emit_swiftui),
    (Target::ReactNative, emit_react_native),
];

fn emit_swiftui(doc: &Document, options: &ExportOptions) -> Result<FileSet> {
    emit_with(&SwiftUiBackend::new(options, doc)?, doc)
}

fn emit_react_native(doc: &Document, options: &ExportOptions) -> Result<FileSet> {
    emit_with(&ReactNativeBackend::new(options, doc)?, doc)
}

/// Render `node` and its subtree, children before parents.
pub fn render_node<B: Backend>(backend: &B, node: &Node) -> Result<B::Fragment> {
    let fragment = match node {
        Node::Group(group) => {
            let children = group
                .children
                .iter()
                .map(|child| render_node(backend, child))
                .collect::<Result<Vec<_>>>()?;
            backend.render_group(group, children)?
        }
        Node::Shape(shape) => backend.render_shape(shape)?,
        Node::Text(text) => backend.render_text(text)?,
        Node::Image(image) => backend.render_image(image)?,
    };
    trace!(
        backend = backend.target().name(),
        kind = node.kind().as_str(),
        id = node.id().as_str();
        "Rendered fragment"
    );
    Ok(fragment)
}

/// Emit `doc` with an already constructed backend.
pub fn emit_with<B: Backend>(backend: &B, doc: &Document) -> Result<FileSet> {
    let children = doc
        .root()
        .children
        .iter()
        .map(|node| render_node(backend, node))
        .collect::<Result<Vec<_>>>()?;

    let mut files = backend.render_document(doc, children)?;
    for asset in doc.assets() {
        files.extend(backend.asset_files(asset)?);
    }

    info!(
        backend = backend.target().name(),
        files = files.len();
        "Emitted target"
    );
    Ok(FileSet {
        target: backend.target(),
        files,
    })
}

/// Emit one target.
pub fn emit(doc: &Document, target: Target, options: &ExportOptions) -> Result<FileSet> {
    let emitter = EMITTERS
        .iter()
        .find(|(t, _)| *t == target)
        .map(|(_, f)| *f)
        .ok_or_else(|| CodegenError::UnknownTarget(target.name().to_string()))?;
    emitter(doc, options)
}

/// Emit several targets in parallel over the same document.
///
/// Results keep the order of `targets`; the first failure is returned.
pub fn emit_all(doc: &Document, targets: &[Target], options: &ExportOptions) -> Result<Vec<FileSet>> {
    targets
        .par_iter()
        .map(|target| emit(doc, *target, options))
        .collect()
}

impl FileSet {
    /// Write all files into `<out_dir>/<target dir>`.
    ///
    /// Files are staged in a temporary directory inside `out_dir` and moved
    /// into place only once every file has been written, replacing any
    /// previous export of the same target. On failure nothing is left behind.
    pub fn write_to(&self, out_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(out_dir)?;
        let staging = tempfile::Builder::new()
            .prefix(".strata-")
            .tempdir_in(out_dir)?;

        for file in &self.files {
            let path = staging.path().join(&file.path);
            let written = path
                .parent()
                .map_or(Ok(()), fs::create_dir_all)
                .and_then(|_| fs::write(&path, &file.contents));
            if let Err(source) = written {
                return Err(if file.is_asset {
                    CodegenError::AssetWriteFailure {
                        path: out_dir.join(self.target.dir_name()).join(&file.path),
                        source,
                    }
                } else {
                    CodegenError::Io(source)
                });
            }
            debug!(path = file.path.as_str(), bytes = file.contents.len(); "Staged file");
        }

        let dest = out_dir.join(self.target.dir_name());
        if dest.exists() {
            fs::remove_dir_all(&dest)?;
        }
        // After the rename the staging path no longer exists and dropping it is a no-op.
        fs::rename(staging.path(), &dest)?;
        drop(staging);

        let shown = dest.display().to_string();
        info!(backend = self.target.name(), path = shown.as_str(); "Wrote target");
        Ok(dest)
    }
}

/// Build `input` and write every target in `targets` under `out_dir`.
///
/// Returns the directory written for each target.
pub fn export(
    input: &DecodedDocument,
    targets: &[Target],
    options: &ExportOptions,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let doc = ModelBuilder::new().build(input)?;
    let sets = emit_all(&doc, targets, options)?;
    sets.iter().map(|set| set.write_to(out_dir)).collect()
}
