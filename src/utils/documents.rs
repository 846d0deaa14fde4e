use crate::dto::quiz_dto::UploadDocument;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

pub async fn load_document(path: &Path) -> Result<UploadDocument> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| Error::EmptyInput(format!("{} is not a file", path.display())))?;
    let content = fs::read(path).await?;
    Ok(UploadDocument::new(file_name, content))
}

pub async fn load_documents(paths: &[PathBuf]) -> Result<Vec<UploadDocument>> {
    if paths.is_empty() {
        return Err(Error::EmptyInput("no documents selected".to_string()));
    }
    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        documents.push(load_document(path).await?);
    }
    Ok(documents)
}
