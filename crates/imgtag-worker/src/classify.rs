//! Local file classification (`imgtag classify`).

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use imgtag_models::Prediction;
use imgtag_vision::{predict, ImageClassifier};

use crate::error::WorkerResult;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Expand directory arguments into the image files they contain.
///
/// Files are passed through as given; directory entries are filtered by
/// extension and sorted by name.
pub fn collect_image_paths(paths: &[PathBuf]) -> WorkerResult<Vec<PathBuf>> {
    let mut collected = Vec::new();

    for path in paths {
        if !path.is_dir() {
            collected.push(path.clone());
            continue;
        }

        let mut entries: Vec<PathBuf> = std::fs::read_dir(path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && has_image_extension(p))
            .collect();
        entries.sort();
        collected.extend(entries);
    }

    Ok(collected)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Classify each file and print a readable block per image.
///
/// Returns the number of files classified. Unreadable files are logged and
/// skipped; inference errors stop the run.
pub fn classify_files<W: Write>(
    model: &dyn ImageClassifier,
    paths: &[PathBuf],
    top_k: usize,
    out: &mut W,
) -> WorkerResult<usize> {
    let mut classified = 0;

    for path in collect_image_paths(paths)? {
        let image = match image::open(&path) {
            Ok(image) => image,
            Err(e) => {
                warn!(path = %path.display(), "Skipping unreadable image: {}", e);
                continue;
            }
        };

        let prediction = predict(model, &image, top_k)?;
        write_block(out, &path, &prediction)?;
        classified += 1;
    }

    info!(classified, "Local classification finished");
    Ok(classified)
}

fn write_block<W: Write>(out: &mut W, path: &Path, prediction: &Prediction) -> std::io::Result<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_else(|| path.to_string_lossy());

    writeln!(out, "filename: {}", name)?;
    writeln!(out, "predictions:")?;
    for entry in prediction {
        writeln!(out, "  {}: {}", entry.label, entry.score)?;
    }
    writeln!(out)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use imgtag_models::LabelScore;

    #[test]
    fn test_collect_expands_directories() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.jpg", "a.PNG", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let explicit = PathBuf::from("/tmp/explicit.gif");

        let paths = collect_image_paths(&[dir.path().to_path_buf(), explicit.clone()]).unwrap();

        assert_eq!(
            paths,
            vec![dir.path().join("a.PNG"), dir.path().join("b.jpg"), explicit]
        );
    }

    #[test]
    fn test_block_format() {
        let prediction = Prediction::from_ranked(vec![
            LabelScore::new("tabby", 0.75),
            LabelScore::new("tiger_cat", 0.125),
        ]);
        let mut out = Vec::new();
        write_block(&mut out, Path::new("data/cat.jpg"), &prediction).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "filename: cat.jpg\npredictions:\n  tabby: 0.75\n  tiger_cat: 0.125\n\n"
        );
    }
}
