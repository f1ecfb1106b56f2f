// src/crawl/pipeline.rs
// =============================================================================
// Runs the whole crawl: frontier -> fetch -> extract -> aggregate -> store.
//
// How it works:
// 1. Load the processed links and drop them from the seed links (dedupe)
// 2. For each remaining link, fetch the article and its comments page at the
//    same time, extract their text and fold it into one NGramBatch
// 3. Up to `concurrency` links are in flight at once, but results come back
//    in frontier order and are written by this one loop, so only one page
//    touches the store at a time
// 4. Each page is committed in a single transaction together with its link
//
// Failures:
// - fatal errors (see CrawlError::is_fatal) can only happen before the loop
//   starts and stop the run
// - a page that fails to fetch, parse or commit is skipped: nothing is
//   written and the link is not marked, so the next run tries it again
//
// Rust concepts:
// - futures::join!: wait for two futures concurrently
// - StreamExt::buffered(n): run up to n futures, yield results in input order
// =============================================================================

use super::fetch::{comments_url, Fetch, FetchedPage, HttpFetcher};
use super::progress::Progress;
use crate::error::CrawlError;
use crate::extract::{extract, Extraction, PageKind};
use crate::links::{collapse_repeats, dedupe, read_seed_dir, Dedupe};
use crate::store::FrequencyStore;
use crate::tokenize::{Alphabet, NGramBatch, Tokenizer};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Everything a crawl run needs, built from the command line
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub sources: PathBuf,
    pub db: PathBuf,
    pub concurrency: usize,
    pub timeout: Duration,
    pub alphabet: Alphabet,
    pub compact: bool,
}

/// What a run did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlSummary {
    /// Links read from the seed files
    pub seeds: usize,
    /// Seed links already processed by an earlier run
    pub duplicates: usize,
    /// Links this run tried to process
    pub frontier: usize,
    /// Pages committed to the store
    pub stored: usize,
    /// Pages skipped because of an error
    pub failed: usize,
    /// Article/comment pages that answered with a non-success status
    pub absent_pages: usize,
    /// Word occurrences written
    pub words: usize,
    /// Letter occurrences written
    pub letters: usize,
    pub elapsed_secs: u64,
}

// One page, ready to be committed
struct PageHarvest {
    batch: NGramBatch,
    fragments: usize,
    absent_pages: usize,
}

// Full run against the real network and the store file
pub async fn run_crawl(config: &CrawlConfig) -> Result<CrawlSummary, CrawlError> {
    info!(db = %config.db.display(), "preparing store");
    let mut store = FrequencyStore::open(&config.db).map_err(|source| CrawlError::Setup {
        path: config.db.clone(),
        source,
    })?;

    info!(sources = %config.sources.display(), "reading seed links");
    let seeds = read_seed_dir(&config.sources).await?;
    info!("{} links read", seeds.len());

    let fetcher = HttpFetcher::new(config.timeout)?;
    let tokenizer = Tokenizer::new(config.alphabet);

    let summary = crawl(
        &fetcher,
        &tokenizer,
        &mut store,
        seeds,
        config.concurrency,
        &config.db,
    )
    .await?;

    if config.compact {
        info!("compacting store");
        // Every page is already committed, a failed compaction loses nothing
        if let Err(e) = store.compact() {
            warn!(error = %e, "store compaction failed");
        }
    }

    Ok(summary)
}

// Dedupes `seeds` against the store and processes what is left
//
// Parameters:
//   fetcher: where pages come from (HTTP in production, a fake in tests)
//   store: the frequency store; only this function writes to it
//   seeds: candidate links, in seed order
//   concurrency: how many links may be fetched/extracted at once
//   db: store location, only used for error reporting
pub async fn crawl<F: Fetch>(
    fetcher: &F,
    tokenizer: &Tokenizer,
    store: &mut FrequencyStore,
    seeds: Vec<String>,
    concurrency: usize,
    db: &Path,
) -> Result<CrawlSummary, CrawlError> {
    let processed = store.processed_links().map_err(|source| CrawlError::Setup {
        path: db.to_path_buf(),
        source,
    })?;

    let mut summary = CrawlSummary {
        seeds: seeds.len(),
        ..CrawlSummary::default()
    };

    info!("searching for duplicates");
    let Dedupe { fresh, duplicates } = dedupe(&processed, seeds);
    let frontier = collapse_repeats(fresh);
    summary.duplicates = duplicates;
    summary.frontier = frontier.len();

    info!(frontier = frontier.len(), "start scraping");
    let mut progress = Progress::new(frontier.len() * 2);

    let mut pages = stream::iter(frontier)
        .map(move |link| async move {
            let harvest = harvest_page(fetcher, tokenizer, &link).await;
            (link, harvest)
        })
        .buffered(concurrency.max(1));

    while let Some((link, harvest)) = pages.next().await {
        let committed = harvest.and_then(|page| {
            store
                .commit_page(&link, &page.batch)
                .map(|_| page)
                .map_err(|source| CrawlError::Persist {
                    link: link.clone(),
                    source,
                })
        });

        match committed {
            Ok(page) => {
                debug!(
                    link = %link,
                    fragments = page.fragments,
                    words = page.batch.words.len(),
                    "page stored"
                );
                summary.stored += 1;
                summary.absent_pages += page.absent_pages;
                summary.words += page.batch.words.len();
                summary.letters += page.batch.letters.len();
            }
            Err(e) => {
                warn!(link = %link, error = %e, "page skipped");
                summary.failed += 1;
            }
        }

        progress.advance(2);
    }

    summary.elapsed_secs = progress.elapsed().as_secs();
    info!(
        stored = summary.stored,
        failed = summary.failed,
        "done scraping"
    );
    Ok(summary)
}

// Fetches and extracts the article and comments of one link
async fn harvest_page<F: Fetch>(
    fetcher: &F,
    tokenizer: &Tokenizer,
    link: &str,
) -> Result<PageHarvest, CrawlError> {
    let comments_link = comments_url(link)?;

    let (article, comments) = futures::join!(fetcher.fetch(link), fetcher.fetch(&comments_link));
    let (article, comments) = (article?, comments?);

    let absent_pages = usize::from(!article.status_ok) + usize::from(!comments.status_ok);
    let article = page_text(&article, PageKind::Article);
    let comments = page_text(&comments, PageKind::Comments);
    debug!(
        link,
        article_layout = ?article.layout,
        comments_layout = ?comments.layout,
        "page extracted"
    );

    let fragments = article.fragments.iter().chain(comments.fragments.iter());
    let batch = tokenizer.aggregate_all(fragments.clone().map(String::as_str));
    if batch.is_empty() {
        debug!(link, "no words on page");
    }

    Ok(PageHarvest {
        batch,
        fragments: fragments.count(),
        absent_pages,
    })
}

// A non-success status means "no content", not an error
fn page_text(page: &FetchedPage, kind: PageKind) -> Extraction {
    if page.status_ok {
        extract(&page.markup, kind)
    } else {
        Extraction::empty()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. buffered vs buffer_unordered
//    - Both run up to N futures at once
//    - buffer_unordered yields whichever finishes first
//    - buffered yields results in the order the futures were created
//    - We want frontier order, so links are committed one after another
//
// 2. Why isn't the store shared between tasks?
//    - Only the `while let` loop touches it
//    - Concurrent futures just fetch and parse, they never write
//    - No Mutex or Arc is needed
//
// 3. What does futures::join! do?
//    - Polls both futures until both are done
//    - Returns a tuple with both outputs
//    - Unlike `?` on each await in turn, the two requests overlap
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NGramKind;
    use std::collections::{HashMap, HashSet};

    // Serves canned pages; unknown URLs answer with a non-success status
    #[derive(Default)]
    struct FakeFetcher {
        pages: HashMap<String, String>,
        broken: HashSet<String>,
    }

    impl FakeFetcher {
        fn page(mut self, url: &str, markup: &str) -> Self {
            self.pages.insert(url.to_string(), markup.to_string());
            self
        }

        fn broken(mut self, url: &str) -> Self {
            self.broken.insert(url.to_string());
            self
        }
    }

    impl Fetch for FakeFetcher {
        async fn fetch(&self, uri: &str) -> Result<FetchedPage, CrawlError> {
            if self.broken.contains(uri) {
                return Err(CrawlError::Fetch {
                    url: uri.to_string(),
                    reason: "connection reset".to_string(),
                });
            }
            Ok(self
                .pages
                .get(uri)
                .map(FetchedPage::ok)
                .unwrap_or_else(FetchedPage::absent))
        }
    }

    const LINK_1: &str = "https://habr.com/ru/articles/1/";
    const LINK_2: &str = "https://habr.com/ru/articles/2/";
    const LINK_3: &str = "https://habr.com/ru/articles/3/";

    fn article_v2(title: &str, body: &str) -> String {
        format!(
            r#"<h1 class="tm-title tm-title_h1"><span>{title}</span></h1>
            <div class="article-formatted-body article-formatted-body_version-2"><div>{body}</div></div>"#
        )
    }

    // 13 words in total:
    //   1: "Первая статья" + "Кот и пёс" + comment "Согласен"       = 6
    //   2: legacy "Один<br>два", comments page missing              = 2
    //   3: "Третья" + "Раздел" + "«Текст», — да." + comment "Хорошо" = 5
    fn fixture() -> FakeFetcher {
        FakeFetcher::default()
            .page(LINK_1, &article_v2("Первая статья", "<p>Кот и пёс</p>"))
            .page(
                "https://habr.com/ru/articles/1/comments",
                r#"<div class="tm-comment__body-content tm-comment__body-content_v2"><div><p>Согласен</p></div></div>"#,
            )
            .page(
                LINK_2,
                r#"<div class="article-formatted-body article-formatted-body_version-1"><div>Один<br>два</div></div>"#,
            )
            .page(
                LINK_3,
                &article_v2("Третья", "<h2>Раздел</h2><p>&laquo;Текст&raquo;, &mdash; да.</p>"),
            )
            .page(
                "https://habr.com/ru/articles/3/comments",
                r#"<div class="tm-comment__body-content"><div>Хорошо</div></div>"#,
            )
    }

    fn seed_links() -> Vec<String> {
        vec![LINK_1.to_string(), LINK_2.to_string(), LINK_3.to_string()]
    }

    async fn run(fetcher: &FakeFetcher, store: &mut FrequencyStore, seeds: Vec<String>) -> CrawlSummary {
        crawl(fetcher, &Tokenizer::default(), store, seeds, 2, Path::new(":memory:"))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_from_seed_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("habr.txt"),
            format!("{LINK_1}\r\n{LINK_2}\r\n\r\n{LINK_3}\r\n"),
        )
        .unwrap();
        let seeds = read_seed_dir(dir.path()).await.unwrap();

        let mut store = FrequencyStore::open_in_memory().unwrap();
        let summary = run(&fixture(), &mut store, seeds).await;

        assert_eq!(summary.frontier, 3);
        assert_eq!(summary.stored, 3);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.absent_pages, 1);
        assert_eq!(summary.words, 13);

        let processed = store.processed_links().unwrap();
        let expected: HashSet<String> = seed_links().into_iter().collect();
        assert_eq!(processed, expected);
        assert_eq!(store.total_words().unwrap(), 13);
        assert_eq!(store.word_count("текст").unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_second_run_changes_nothing() {
        let fetcher = fixture();
        let mut store = FrequencyStore::open_in_memory().unwrap();
        run(&fetcher, &mut store, seed_links()).await;
        let letters_before = store.top_values(NGramKind::Letter, 100).unwrap();

        let summary = run(&fetcher, &mut store, seed_links()).await;
        assert_eq!(summary.duplicates, 3);
        assert_eq!(summary.frontier, 0);
        assert_eq!(summary.stored, 0);
        assert_eq!(store.total_words().unwrap(), 13);
        assert_eq!(store.top_values(NGramKind::Letter, 100).unwrap(), letters_before);
    }

    #[tokio::test]
    async fn test_transport_error_skips_page_without_marking() {
        let fetcher = fixture().broken("https://habr.com/ru/articles/1/comments");
        let mut store = FrequencyStore::open_in_memory().unwrap();
        let summary = run(&fetcher, &mut store, seed_links()).await;

        assert_eq!(summary.stored, 2);
        assert_eq!(summary.failed, 1);
        let processed = store.processed_links().unwrap();
        assert!(!processed.contains(LINK_1));
        // nothing from the failed article leaked into the counts
        assert_eq!(store.word_count("кот").unwrap(), None);
        assert_eq!(store.total_words().unwrap(), 13 - 6);

        // the next run picks the link up again
        let summary = run(&fixture(), &mut store, seed_links()).await;
        assert_eq!(summary.frontier, 1);
        assert_eq!(store.total_words().unwrap(), 13);
    }

    #[tokio::test]
    async fn test_invalid_and_repeated_links() {
        let mut store = FrequencyStore::open_in_memory().unwrap();
        let seeds = vec![
            "not a link".to_string(),
            LINK_2.to_string(),
            LINK_2.to_string(),
        ];
        let summary = run(&fixture(), &mut store, seeds).await;

        assert_eq!(summary.frontier, 2);
        assert_eq!(summary.stored, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(store.word_count("один").unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_absent_pages_are_marked_with_no_counts() {
        let mut store = FrequencyStore::open_in_memory().unwrap();
        let link = "https://habr.com/ru/articles/404/".to_string();
        let summary = run(&FakeFetcher::default(), &mut store, vec![link.clone()]).await;

        assert_eq!(summary.stored, 1);
        assert_eq!(summary.absent_pages, 2);
        assert!(store.processed_links().unwrap().contains(&link));
        assert_eq!(store.total_words().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_commit_skips_page_and_continues() {
        let mut store = FrequencyStore::open_in_memory().unwrap();
        store
            .execute_script(&format!(
                "CREATE TRIGGER reject_link BEFORE INSERT ON links
                 WHEN NEW.link = '{LINK_2}'
                 BEGIN SELECT RAISE(ABORT, 'disk full'); END;"
            ))
            .unwrap();

        let summary = run(&fixture(), &mut store, seed_links()).await;

        assert_eq!(summary.stored, 2);
        assert_eq!(summary.failed, 1);
        let processed = store.processed_links().unwrap();
        assert!(processed.contains(LINK_1));
        assert!(!processed.contains(LINK_2));
        assert!(processed.contains(LINK_3));
        // the rejected page's words were rolled back with its link
        assert_eq!(store.word_count("один").unwrap(), None);
        assert_eq!(store.word_count("два").unwrap(), None);
        assert_eq!(store.total_words().unwrap(), 13 - 2);
    }

    #[tokio::test]
    async fn test_line_terminated_seed_is_not_crawled_twice() {
        let mut store = FrequencyStore::open_in_memory().unwrap();
        let seeds = vec![format!("{LINK_2}\r")];

        let summary = run(&fixture(), &mut store, seeds.clone()).await;
        assert_eq!(summary.stored, 1);
        assert!(store.processed_links().unwrap().contains(LINK_2));

        let summary = run(&fixture(), &mut store, seeds).await;
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.frontier, 0);
        assert_eq!(store.word_count("один").unwrap(), Some(1));
    }
}
