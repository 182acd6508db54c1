// ============================================================
// Layer 4 — IDX Corpus Loader
// ============================================================
// Loads MNIST or Fashion-MNIST from the four standard IDX files:
//
//   train-images-idx3-ubyte   train-labels-idx1-ubyte
//   t10k-images-idx3-ubyte    t10k-labels-idx1-ubyte
//
// IDX layout (all integers big-endian u32):
//
//   images: magic=2051 | count | rows | cols | pixels (u8)...
//   labels: magic=2049 | count | labels (u8)...
//
// Both datasets share the format, so one loader serves both.
// Downloading the files is left to the user.
//
// Reference: Rust Book §9 (Error Handling)

use anyhow::{bail, ensure, Context, Result};
use std::{fs, path::{Path, PathBuf}};

use crate::data::preprocessor::Preprocessor;
use crate::domain::item::{Corpus, NUM_CLASSES};
use crate::domain::traits::{CorpusSource, Split};

const IMAGES_MAGIC: u32 = 2051;
const LABELS_MAGIC: u32 = 2049;

/// Reads IDX files from a directory.
/// Implements the CorpusSource trait from Layer 3.
pub struct IdxLoader {
    dir:   PathBuf,
    /// Optional cap on how many images to read per split
    limit: Option<usize>,
}

impl IdxLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), limit: None }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    fn file_names(split: Split) -> (&'static str, &'static str) {
        match split {
            Split::Train => ("train-images-idx3-ubyte", "train-labels-idx1-ubyte"),
            Split::Test  => ("t10k-images-idx3-ubyte",  "t10k-labels-idx1-ubyte"),
        }
    }
}

impl CorpusSource for IdxLoader {
    fn load(&self, split: Split) -> Result<Corpus> {
        let (images_name, labels_name) = Self::file_names(split);

        let image_bytes = read_file(&self.dir.join(images_name))?;
        let label_bytes = read_file(&self.dir.join(labels_name))?;

        let (images, rows, cols) = parse_images(&image_bytes)
            .with_context(|| format!("Invalid image file '{images_name}'"))?;
        let labels = parse_labels(&label_bytes)
            .with_context(|| format!("Invalid label file '{labels_name}'"))?;

        ensure!(
            images.len() == labels.len(),
            "Image / label count mismatch: {} images, {} labels",
            images.len(),
            labels.len()
        );

        let mut corpus = Corpus::new(images, labels);
        if let Some(limit) = self.limit {
            corpus.truncate(limit);
        }

        tracing::info!(
            "Loaded {:?} split: {} images of {}x{} from '{}'",
            split,
            corpus.len(),
            rows,
            cols,
            self.dir.display()
        );
        Ok(corpus)
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| {
        format!(
            "Cannot read '{}'. Download the MNIST / Fashion-MNIST IDX files first.",
            path.display()
        )
    })
}

/// Read a big-endian u32 and advance the offset.
fn read_be_u32(data: &[u8], offset: &mut usize) -> Result<u32> {
    let Some(bytes) = data.get(*offset..*offset + 4) else {
        bail!("Unexpected end of file while reading header at byte {}", *offset);
    };
    *offset += 4;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Parse an idx3 image file into normalised, flattened images.
/// Returns (images, rows, cols).
pub fn parse_images(data: &[u8]) -> Result<(Vec<Vec<f32>>, usize, usize)> {
    let mut offset = 0usize;
    let magic = read_be_u32(data, &mut offset)?;
    ensure!(magic == IMAGES_MAGIC, "Bad magic number {magic}, expected {IMAGES_MAGIC}");

    let count = read_be_u32(data, &mut offset)? as usize;
    let rows  = read_be_u32(data, &mut offset)? as usize;
    let cols  = read_be_u32(data, &mut offset)? as usize;

    let image_size = rows * cols;
    let needed     = count.saturating_mul(image_size);
    ensure!(
        data.len() - offset >= needed,
        "Image file is truncated: need {} pixel bytes, found {}",
        needed,
        data.len() - offset
    );

    let images = Preprocessor::new().normalize_all(&data[offset..offset + needed], image_size);
    Ok((images, rows, cols))
}

/// Parse an idx1 label file.
pub fn parse_labels(data: &[u8]) -> Result<Vec<u8>> {
    let mut offset = 0usize;
    let magic = read_be_u32(data, &mut offset)?;
    ensure!(magic == LABELS_MAGIC, "Bad magic number {magic}, expected {LABELS_MAGIC}");

    let count = read_be_u32(data, &mut offset)? as usize;
    ensure!(
        data.len() - offset >= count,
        "Label file is truncated: need {} labels, found {}",
        count,
        data.len() - offset
    );

    let labels = data[offset..offset + count].to_vec();
    if let Some(bad) = labels.iter().find(|&&l| l >= NUM_CLASSES) {
        bail!("Label {bad} is outside 0..{NUM_CLASSES}");
    }
    Ok(labels)
}
