use sinklog::*;
use std::fs;
use std::io::Read;
use std::path::Path;

fn facade(directory: &Path, max_file_size: u64, max_files: usize) -> Facade {
    let file = FileConfig {
        prefix: "journal".to_string(),
        max_file_size,
        max_files,
        ..FileConfig::new(directory)
    };
    Builder::from(Config::quiet(Severity::Verbose))
        .file(Some(file))
        .start()
}

#[test]
fn queued_records_reach_the_file_on_flush() {
    let dir = tempfile::tempdir().unwrap();
    let facade = facade(dir.path(), 1024 * 1024, 10);

    facade.log(Severity::Info, "queued", location!());
    let sink = facade.file_sink().unwrap();
    assert_eq!(sink.directory(), dir.path());

    facade.flush();
    let files = facade.log_files();
    assert_eq!(files.len(), 1);
    let contents = fs::read_to_string(&files[0]).unwrap();
    assert!(contents.contains("| queued\n"), "{contents}");
}

#[test]
fn sync_records_are_written_before_returning() {
    let dir = tempfile::tempdir().unwrap();
    let facade = facade(dir.path(), 1024 * 1024, 10);

    facade.log(Severity::Info, "first", location!());
    sync_error!(logger: &facade, "second {}", 2);

    // the sync record drained the queued one ahead of it
    let files = facade.log_files();
    let contents = fs::read_to_string(&files[0]).unwrap();
    let first = contents.find("| first").unwrap();
    let second = contents.find("| second 2").unwrap();
    assert!(first < second);
}

#[test]
fn at_most_ten_files_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let facade = facade(dir.path(), 64, 30);

    // every line is longer than the size limit, so every line starts a file
    for i in 0..25 {
        sync_info!(logger: &facade, "record number {i} with some padding to roll the file");
    }

    let sink = facade.file_sink().unwrap();
    assert_eq!(sink.retained_files().len(), 25);

    let files = facade.log_files();
    assert_eq!(files.len(), MAX_REPORTED_FILES);

    // newest first
    let newest = fs::read_to_string(&files[0]).unwrap();
    assert!(newest.contains("record number 24 "), "{newest}");
    let mut sorted = files.clone();
    sorted.sort();
    sorted.reverse();
    assert_eq!(files, sorted);
}

#[test]
fn archive_holds_every_retained_file() {
    let dir = tempfile::tempdir().unwrap();
    let facade = facade(dir.path(), 64, 30);

    for i in 0..12 {
        info!(logger: &facade, "archived record {i} with some padding to roll the file");
    }

    // pending records are flushed into the files before archiving
    let archive = facade.logs_archive().unwrap();
    let retained = facade.file_sink().unwrap().retained_files();
    assert_eq!(retained.len(), 12);

    let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(&archive[..]));
    let mut names = Vec::new();
    let mut text = String::new();
    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        names.push(entry.path().unwrap().display().to_string());
        entry.read_to_string(&mut text).unwrap();
    }

    names.sort();
    let mut expected: Vec<String> = retained
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    expected.sort();
    assert_eq!(names, expected);

    for i in 0..12 {
        assert!(text.contains(&format!("archived record {i} ")));
    }
}

#[test]
fn unusable_directory_skips_the_file_sink() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-directory");
    fs::write(&blocker, "").unwrap();

    let facade = facade(&blocker, 1024, 10);
    assert!(facade.file_sink().is_none());
    assert!(facade.log_files().is_empty());
    assert!(facade.logs_archive().is_none());
    assert_eq!(facade.delivery_failures(), 1);

    // logging still works without it
    facade.log(Severity::Error, "nowhere", location!());
}

#[test]
fn temp_directories() {
    let path = temp_directory().unwrap();
    assert!(path.is_dir());
    assert!(path.starts_with(std::env::temp_dir()));
    fs::remove_dir(path).unwrap();
}
