use std::path::Path;

use snafu::OptionExt;

use crate::extract::*;

/// Resolves a path of the configuration, relative to its directory.
pub fn source_path(root: &Path, file_path: &str) -> String {
    root.join(file_path).to_string_lossy().to_string()
}

/// The name of a file without its directory and extension, used as the
/// default name of a table.
pub fn simplify_file_name(path: &str) -> TabResult<String> {
    let stem = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .whatever_context(format!("no file name in path {:?}", path))?;
    Ok(stem.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names() {
        assert_eq!(
            simplify_file_name("/data/2025/Table 14.csv").unwrap(),
            "Table 14"
        );
        assert_eq!(
            source_path(Path::new("/data/2025"), "t.csv"),
            "/data/2025/t.csv"
        );
        assert_eq!(source_path(Path::new("/data"), "/abs/t.csv"), "/abs/t.csv");
    }
}
