// src/links/seeds.rs
// =============================================================================
// Reads seed links from a directory of plain-text files.
//
// File format:
// - one link per line
// - lines may end with "\r\n" (files saved on Windows)
// - blank lines are ignored
//
// Every file is read on its own tokio task. The results are concatenated in
// file-name order, so the same directory always yields the same link order.
//
// Rust concepts:
// - tokio::spawn: run work on the runtime's task pool
// - JoinHandle: await the result of a spawned task
// - futures::future::join_all: wait for many futures at once
// =============================================================================

use crate::error::CrawlError;
use futures::future::join_all;
use std::path::{Path, PathBuf};
use tracing::debug;

// Reads every regular file in `dir` and returns all links found
//
// Parameters:
//   dir: the seed directory (sub-directories are skipped)
//
// Returns: links in file-name order, then line order inside each file
//
// Any unreadable entry is a fatal Seeds error.
pub async fn read_seed_dir(dir: &Path) -> Result<Vec<String>, CrawlError> {
    let seeds_err = |path: &Path, source: std::io::Error| CrawlError::Seeds {
        path: path.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| seeds_err(dir, e))?;

    let mut files: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| seeds_err(dir, e))? {
        let file_type = entry.file_type().await.map_err(|e| seeds_err(&entry.path(), e))?;
        if file_type.is_dir() {
            continue;
        }
        files.push(entry.path());
    }
    files.sort();

    // One task per file; handles keep file order
    let handles = files.into_iter().map(|path| {
        tokio::spawn(async move {
            let content = tokio::fs::read_to_string(&path).await;
            (path, content)
        })
    });

    let mut links = Vec::new();
    for joined in join_all(handles).await {
        let (path, content) = joined.map_err(|e| seeds_err(dir, std::io::Error::other(e)))?;
        let content = content.map_err(|e| seeds_err(&path, e))?;
        let found = split_links(&content);
        debug!(file = %path.display(), links = found.len(), "seed file read");
        links.extend(found);
    }

    Ok(links)
}

// Splits file content into links, one per line
//
// Example:
//   "https://a\r\n\r\nhttps://b\n" -> ["https://a", "https://b"]
pub fn split_links(content: &str) -> Vec<String> {
    content
        .split('\n')
        .map(|line| line.trim_matches(|c| c == '\r' || c == '\n'))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_links_handles_crlf_and_blank_lines() {
        let links = split_links("https://a.com/1\r\n\r\nhttps://a.com/2\n\n");
        assert_eq!(links, vec!["https://a.com/1", "https://a.com/2"]);
    }

    #[test]
    fn test_split_links_keeps_inner_spaces() {
        // Only line terminators are trimmed
        let links = split_links("https://a.com/1 \n");
        assert_eq!(links, vec!["https://a.com/1 "]);
    }

    #[tokio::test]
    async fn test_read_seed_dir_in_file_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "https://x.com/3\n").unwrap();
        std::fs::write(dir.path().join("a.txt"), "https://x.com/1\r\nhttps://x.com/2\r\n").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let links = read_seed_dir(dir.path()).await.unwrap();
        assert_eq!(links, vec!["https://x.com/1", "https://x.com/2", "https://x.com/3"]);
    }

    #[tokio::test]
    async fn test_missing_seed_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_seed_dir(&dir.path().join("missing")).await.unwrap_err();
        assert!(err.is_fatal());
    }
}
