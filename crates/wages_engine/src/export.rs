use std::path::{Path, PathBuf};

use wages_core::{Document, WageError};
use wages_logging::wages_info;

use crate::codec::{encode, template, FileFormat};
use crate::persist::AtomicFileWriter;

/// `wage-rates-YYYY-MM-DD.<ext>`.
pub fn export_filename(format: FileFormat, date: &str) -> String {
    format!("wage-rates-{date}.{}", format.extension())
}

pub fn template_filename(format: FileFormat) -> String {
    format!("wage-rates-template.{}", format.extension())
}

/// Encodes `document` and writes it into `dir` under the dated export name.
pub fn write_export(
    dir: &Path,
    document: &Document,
    format: FileFormat,
    today: &str,
    exported_at: &str,
) -> Result<PathBuf, WageError> {
    let bytes = encode(format, document, exported_at)?;
    let path = AtomicFileWriter::new(dir.to_path_buf())
        .write(&export_filename(format, today), &bytes)?;
    wages_info!(
        "Exported {} regions to {}",
        document.regions.len(),
        path.display()
    );
    Ok(path)
}

pub fn write_template(dir: &Path, format: FileFormat) -> Result<PathBuf, WageError> {
    let bytes = template(format)?;
    let path = AtomicFileWriter::new(dir.to_path_buf()).write(&template_filename(format), &bytes)?;
    wages_info!("Wrote {} template to {}", format.extension(), path.display());
    Ok(path)
}
