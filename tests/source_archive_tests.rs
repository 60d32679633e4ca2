//! Source archives built from real git repositories.

mod common;

use chrono::DateTime;
use common::TestRepo;
use release_packager::packager::{
    ArchiveFormat, EntryTime, Error, ExtraFile, Releaser, SettingsBuilder, SourceArchiver,
    SystemExecutor,
};
use std::io::Read;
use std::path::Path;

const T1: &str = "2024-01-01T10:00:00+00:00";
const T2: &str = "2024-02-01T10:00:00+00:00";
const T3: &str = "2024-03-01T10:00:00+00:00";

fn two_file_repo() -> Option<TestRepo> {
    let repo = TestRepo::new()?;
    repo.write("a.txt", "hi");
    repo.commit("add a", T1);
    repo.write("b.txt", "bye");
    #[cfg(unix)]
    repo.chmod("b.txt", 0o755);
    repo.commit("add b", T2);
    Some(repo)
}

fn zip_names(path: &Path) -> Vec<String> {
    let mut zip = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
    (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect()
}

fn tar_gz_entries(path: &Path) -> Vec<(String, u32, u64)> {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(file));
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let entry = entry.unwrap();
            let header = entry.header();
            (
                entry.path().unwrap().to_string_lossy().into_owned(),
                header.mode().unwrap(),
                header.mtime().unwrap(),
            )
        })
        .collect()
}

fn markers(commit: &str) -> Vec<ExtraFile> {
    let t2 = DateTime::parse_from_rfc3339(T2).unwrap();
    vec![
        ExtraFile::marker("VERSION.txt", "1.0.0\n", EntryTime::At(t2)),
        ExtraFile::marker(".git-hash", format!("{commit}\n"), EntryTime::At(t2)),
    ]
}

#[tokio::test]
async fn two_file_commit_end_to_end() {
    let Some(repo) = two_file_repo() else { return };
    let commit = repo.git(&["rev-parse", "HEAD"], T2).trim().to_string();
    let out = tempfile::tempdir().unwrap();

    let archiver = SourceArchiver::new(SystemExecutor::new(repo.path()), out.path(), "p-1.0.0");
    let outputs = archiver
        .build_archive(&commit, markers(&commit), &[ArchiveFormat::Zip, ArchiveFormat::TarGz])
        .await
        .unwrap();

    assert_eq!(
        zip_names(&outputs[&ArchiveFormat::Zip]),
        [
            "p-1.0.0/a.txt",
            "p-1.0.0/b.txt",
            "p-1.0.0/VERSION.txt",
            "p-1.0.0/.git-hash"
        ]
    );

    let entries = tar_gz_entries(&outputs[&ArchiveFormat::TarGz]);
    assert_eq!(entries[0], ("p-1.0.0/a.txt".to_string(), 0o644, 1_704_103_200));
    assert_eq!(entries[1].0, "p-1.0.0/b.txt");
    assert_eq!(entries[1].2, 1_706_781_600);
    #[cfg(unix)]
    assert_eq!(entries[1].1, 0o755);
    assert_eq!(entries[3].1, 0o644);

    let mut zip =
        zip::ZipArchive::new(std::fs::File::open(&outputs[&ArchiveFormat::Zip]).unwrap()).unwrap();
    let mut hash = String::new();
    zip.by_name("p-1.0.0/.git-hash")
        .unwrap()
        .read_to_string(&mut hash)
        .unwrap();
    assert_eq!(hash, format!("{commit}\n"));
}

#[tokio::test]
async fn rebuilding_is_byte_identical() {
    let Some(repo) = two_file_repo() else { return };
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    for out in [&first, &second] {
        SourceArchiver::new(SystemExecutor::new(repo.path()), out.path(), "p-1.0.0")
            .build_archive("HEAD", markers("HEAD"), &ArchiveFormat::ALL)
            .await
            .unwrap();
    }

    for format in ArchiveFormat::ALL {
        let a = std::fs::read(format.output_path(first.path(), "p-1.0.0")).unwrap();
        let b = std::fs::read(format.output_path(second.path(), "p-1.0.0")).unwrap();
        assert_eq!(a, b, "{format} differs between runs");
    }
}

#[tokio::test]
async fn later_change_moves_file_to_the_end() {
    let Some(repo) = two_file_repo() else { return };
    repo.write("a.txt", "hi again");
    repo.commit("touch a", T3);

    let archiver = SourceArchiver::new(SystemExecutor::new(repo.path()), "/unused", "p");
    let entries = archiver.collect_entries("HEAD", Vec::new()).await.unwrap();
    let order: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(order, ["b.txt", "a.txt"]);
    assert_eq!(entries[1].time, DateTime::parse_from_rfc3339(T3).unwrap());
}

#[tokio::test]
async fn older_commit_sees_only_its_tree() {
    let Some(repo) = two_file_repo() else { return };
    let first = repo.git(&["rev-list", "--max-parents=0", "HEAD"], T2);

    let archiver = SourceArchiver::new(SystemExecutor::new(repo.path()), "/unused", "p");
    let entries = archiver
        .collect_entries(first.trim(), Vec::new())
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].path, "a.txt");
    assert_eq!(entries[0].content, b"hi");
}

#[tokio::test]
async fn version_control_files_are_left_out() {
    let Some(repo) = TestRepo::new() else { return };
    repo.write(".gitignore", "build/\n");
    repo.write(".github/workflows/ci.yml", "on: push\n");
    repo.write("src/lib.c", "int x;\n");
    repo.commit("init", T1);

    let archiver = SourceArchiver::new(SystemExecutor::new(repo.path()), "/unused", "p");
    let entries = archiver.collect_entries("HEAD", Vec::new()).await.unwrap();
    let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, ["src/lib.c"]);
}

#[tokio::test]
async fn unknown_commit_is_rejected() {
    let Some(repo) = two_file_repo() else { return };
    let out = tempfile::tempdir().unwrap();
    let err = SourceArchiver::new(SystemExecutor::new(repo.path()), out.path(), "p")
        .build_archive("no-such-tag", Vec::new(), &[ArchiveFormat::Zip])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidCommit { .. }), "{err}");
}

#[tokio::test]
async fn releaser_refuses_dirty_tree_unless_forced() {
    let Some(repo) = two_file_repo() else { return };
    repo.write("untracked.o", "junk");
    let out = tempfile::tempdir().unwrap();

    let settings = |force| {
        SettingsBuilder::new()
            .project("p")
            .version("1.0.0")
            .root(repo.path())
            .dist_path(out.path())
            .formats([ArchiveFormat::Zip])
            .force(force)
            .build()
            .unwrap()
    };

    let err = Releaser::new(settings(false), SystemExecutor::new(repo.path()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DirtyTree));

    let releaser = Releaser::new(settings(true), SystemExecutor::new(repo.path()))
        .await
        .unwrap();
    let artifacts = releaser.create_source_archives().await.unwrap();
    assert_eq!(artifacts.len(), 1);
    assert_eq!(
        zip_names(&artifacts[0].path),
        ["p-1.0.0/a.txt", "p-1.0.0/b.txt", "p-1.0.0/VERSION.txt", "p-1.0.0/.git-hash"]
    );
}
