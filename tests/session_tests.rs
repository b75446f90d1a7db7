// Integration tests for a full match pass: folders, listing, matching, queueing

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use episode_matcher::host::{DirectoryLister, FsDirectoryLister, MemoryDirectoryLister};
use episode_matcher::{
    FolderRole, FolderSelection, JobQueue, JobStatus, MatchError, MatchSession, Matcher,
    SequentialIdGenerator, WorkItem,
};

/// Wraps another lister and counts how often it is asked.
struct CountingLister {
    inner: MemoryDirectoryLister,
    calls: AtomicUsize,
}

impl CountingLister {
    fn new(inner: MemoryDirectoryLister) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }
}

impl DirectoryLister for CountingLister {
    async fn list_directory(&self, path: &Path) -> io::Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list_directory(path).await
    }
}

fn listing() -> MemoryDirectoryLister {
    MemoryDirectoryLister::new()
        .with_folder(
            "/en",
            ["Show.S01E01.1080p.mkv", "Show.S01E02.1080p.mkv", "cover.jpg"],
        )
        .with_folder("/pt", ["show_s01e02_ptbr.mp4", "show_s01e01_ptbr.mp4", "subs.srt"])
}

fn session<L: DirectoryLister>(lister: L) -> MatchSession<L> {
    let mut session = MatchSession::with_matcher(
        lister,
        Matcher::with_id_generator(Box::new(SequentialIdGenerator::new())),
    );
    session.folders = FolderSelection::new().reference("/en").foreign("/pt").output("/out");
    session
}

#[tokio::test]
async fn test_match_pass_builds_preview_and_pending_items() {
    let mut session = session(listing());

    let outcome = session.run_match_pass().await.unwrap();
    assert_eq!(outcome.preview.len(), 2);
    assert_eq!(outcome.work_items.len(), 2);

    let first = &outcome.work_items[0];
    assert_eq!(first.reference_video, PathBuf::from("/en").join("Show.S01E01.1080p.mkv"));
    assert_eq!(first.foreign_video, PathBuf::from("/pt").join("show_s01e01_ptbr.mp4"));
    assert_eq!(first.output_video, PathBuf::from("/out").join("Show.S01E01.1080p.mkv"));

    assert_eq!(session.preview().len(), 2);
    assert_eq!(session.pending().len(), 2);
}

#[tokio::test]
async fn test_missing_folder_blocks_listing() {
    let lister = CountingLister::new(listing());
    let mut session = session(&lister);
    session.folders.set(FolderRole::Output, None);

    let err = session.run_match_pass().await.unwrap_err();
    match err {
        MatchError::Configuration { missing } => assert_eq!(missing, vec![FolderRole::Output]),
        other => panic!("unexpected error: {other}"),
    }

    assert!(session.preview().is_empty());
    assert_eq!(lister.calls.load(Ordering::SeqCst), 0);

    session.folders.set(FolderRole::Output, Some(PathBuf::from("/out")));
    session.run_match_pass().await.unwrap();
    assert_eq!(lister.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_compile_error_clears_previous_results() {
    let mut session = session(listing());
    session.run_match_pass().await.unwrap();
    assert_eq!(session.pending().len(), 2);

    session.rules.replace_rule(1, "[broken");
    let err = session.run_match_pass().await.unwrap_err();
    match err {
        MatchError::Compile(e) => assert_eq!(e.index, 1),
        other => panic!("unexpected error: {other}"),
    }

    assert!(session.preview().is_empty());
    assert!(session.pending().is_empty());
}

#[tokio::test]
async fn test_unreadable_folder_is_reported() {
    let mut session = session(listing());
    session.folders.set(FolderRole::Foreign, Some(PathBuf::from("/missing")));

    let err = session.run_match_pass().await.unwrap_err();
    match err {
        MatchError::DirectoryRead { role, path, source } => {
            assert_eq!(role, FolderRole::Foreign);
            assert_eq!(path, PathBuf::from("/missing"));
            assert_eq!(source.kind(), io::ErrorKind::NotFound);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(session.preview().is_empty());
}

#[tokio::test]
async fn test_queue_takes_ownership_and_notifies() {
    let mut session = session(listing());
    session.run_match_pass().await.unwrap();

    let mut queue = JobQueue::new();
    let mut changes = queue.subscribe();

    assert_eq!(session.queue_pending(&mut queue), 2);
    assert!(session.pending().is_empty());
    assert_eq!(session.preview().len(), 2);
    assert!(changes.has_changed().unwrap());
    assert_eq!(*changes.borrow_and_update(), 2);

    // Nothing left to hand over a second time.
    assert_eq!(session.queue_pending(&mut queue), 0);
    assert!(!changes.has_changed().unwrap());

    let id = queue.items()[0].id.clone();
    assert!(queue.set_status(&id, JobStatus::Processing));
    assert_eq!(queue.pending().count(), 1);

    let drained = queue.drain();
    assert_eq!(drained.len(), 2);
    assert_eq!(*changes.borrow_and_update(), 0);
}

#[tokio::test]
async fn test_queue_into_plain_vec() {
    let mut session = session(listing());
    session.run_match_pass().await.unwrap();

    let mut items: Vec<WorkItem> = Vec::new();
    session.queue_pending(&mut items);
    let ids: Vec<_> = items.iter().map(|item| item.id.to_string()).collect();
    assert_eq!(ids, vec!["job-1", "job-2"]);
}

#[tokio::test]
async fn test_fs_lister_lists_only_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Episode 01.mkv"), b"").unwrap();
    std::fs::write(dir.path().join("readme.txt"), b"").unwrap();
    std::fs::create_dir(dir.path().join("extras.mkv")).unwrap();

    let mut names = FsDirectoryLister.list_directory(dir.path()).await.unwrap();
    names.sort();
    assert_eq!(names, vec!["Episode 01.mkv", "readme.txt"]);

    let missing = FsDirectoryLister
        .list_directory(&dir.path().join("nope"))
        .await
        .unwrap_err();
    assert_eq!(missing.kind(), io::ErrorKind::NotFound);
}

#[tokio::test]
async fn test_fs_session_end_to_end() {
    let root = tempfile::tempdir().unwrap();
    let reference = root.path().join("en");
    let foreign = root.path().join("pt");
    std::fs::create_dir(&reference).unwrap();
    std::fs::create_dir(&foreign).unwrap();
    std::fs::write(reference.join("Movie [BD].mkv"), b"").unwrap();
    std::fs::write(foreign.join("movie.ptbr.mp4"), b"").unwrap();

    let mut session = MatchSession::new(FsDirectoryLister);
    session.folders = FolderSelection::new()
        .reference(&reference)
        .foreign(&foreign)
        .output(root.path().join("out"));

    let outcome = session.run_match_pass().await.unwrap();
    assert_eq!(outcome.work_items.len(), 1);
    assert_eq!(outcome.work_items[0].output_video, root.path().join("out").join("Movie [BD].mkv"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_fs_lister_follows_symlinks() {
    let root = tempfile::tempdir().unwrap();
    let library = root.path().join("library");
    let reference = root.path().join("en");
    let foreign = root.path().join("pt");
    for dir in [&library, &reference, &foreign] {
        std::fs::create_dir(dir).unwrap();
    }
    std::fs::write(library.join("episode.mkv"), b"").unwrap();
    std::os::unix::fs::symlink(library.join("episode.mkv"), reference.join("Show.S01E01.mkv")).unwrap();
    std::os::unix::fs::symlink(library.join("gone.mkv"), reference.join("Show.S01E02.mkv")).unwrap();
    std::os::unix::fs::symlink(&library, reference.join("linked.mkv")).unwrap();
    std::fs::write(foreign.join("show_s01e01.mp4"), b"").unwrap();

    let names = FsDirectoryLister.list_directory(&reference).await.unwrap();
    assert_eq!(names, vec!["Show.S01E01.mkv"]);

    let mut session = MatchSession::new(FsDirectoryLister);
    session.folders = FolderSelection::new()
        .reference(&reference)
        .foreign(&foreign)
        .output(root.path().join("out"));

    let outcome = session.run_match_pass().await.unwrap();
    assert_eq!(outcome.preview.len(), 1);
    assert_eq!(outcome.preview[0].foreign_name.as_deref(), Some("show_s01e01.mp4"));
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_fs_lister_skips_names_that_are_not_utf8() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let root = tempfile::tempdir().unwrap();
    let reference = root.path().join("en");
    let foreign = root.path().join("pt");
    std::fs::create_dir(&reference).unwrap();
    std::fs::create_dir(&foreign).unwrap();
    std::fs::write(reference.join(OsStr::from_bytes(b"Epis\xF3dio 1.mkv")), b"").unwrap();
    std::fs::write(reference.join("Episodio 2.mkv"), b"").unwrap();
    std::fs::write(foreign.join("epis\u{fffd}dio_1.mp4"), b"").unwrap();
    std::fs::write(foreign.join("episodio_2.mp4"), b"").unwrap();

    let names = FsDirectoryLister.list_directory(&reference).await.unwrap();
    assert_eq!(names, vec!["Episodio 2.mkv"]);

    let mut session = MatchSession::new(FsDirectoryLister);
    session.folders = FolderSelection::new()
        .reference(&reference)
        .foreign(&foreign)
        .output(root.path().join("out"));

    let outcome = session.run_match_pass().await.unwrap();
    assert_eq!(outcome.work_items.len(), 1);
    assert!(outcome.work_items.iter().all(|item| item.reference_video.exists()));
}

#[tokio::test]
async fn test_session_notifies_when_pending_items_change() {
    let mut session = session(listing());
    let mut changes = session.subscribe();
    assert!(!changes.has_changed().unwrap());

    session.run_match_pass().await.unwrap();
    assert!(changes.has_changed().unwrap());
    assert_eq!(*changes.borrow_and_update(), 2);

    let mut items: Vec<WorkItem> = Vec::new();
    assert_eq!(session.queue_pending(&mut items), 2);
    assert_eq!(*changes.borrow_and_update(), 0);

    // A failed pass with nothing pending leaves subscribers alone.
    session.folders.set(FolderRole::Reference, None);
    session.run_match_pass().await.unwrap_err();
    assert!(!changes.has_changed().unwrap());

    session.folders.set(FolderRole::Reference, Some(PathBuf::from("/en")));
    session.run_match_pass().await.unwrap();
    assert_eq!(*changes.borrow_and_update(), 2);

    session.folders.set(FolderRole::Foreign, Some(PathBuf::from("/missing")));
    session.run_match_pass().await.unwrap_err();
    assert!(changes.has_changed().unwrap());
    assert_eq!(*changes.borrow_and_update(), 0);
}
