use super::*;

#[test]
fn file_storage_missing_file_loads_none() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileTokenStorage::new(dir.path().join("token"));
    assert_eq!(storage.load().unwrap(), None);
}

#[test]
fn file_storage_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileTokenStorage::new(dir.path().join("nested").join("token"));
    storage.save("abc.def.ghi").unwrap();
    assert_eq!(storage.load().unwrap().as_deref(), Some("abc.def.ghi"));

    // A second instance over the same path sees the same token.
    let restarted = FileTokenStorage::new(storage.path());
    assert_eq!(restarted.load().unwrap().as_deref(), Some("abc.def.ghi"));
}

#[test]
fn file_storage_trims_and_treats_blank_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token");
    std::fs::write(&path, "  tok\n").unwrap();
    let storage = FileTokenStorage::new(&path);
    assert_eq!(storage.load().unwrap().as_deref(), Some("tok"));

    std::fs::write(&path, "\n").unwrap();
    assert_eq!(storage.load().unwrap(), None);
}

#[test]
fn file_storage_clear_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileTokenStorage::new(dir.path().join("token"));
    storage.save("tok").unwrap();
    storage.clear().unwrap();
    storage.clear().unwrap();
    assert_eq!(storage.load().unwrap(), None);
}

#[cfg(unix)]
#[test]
fn file_storage_restricts_permissions() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempfile::tempdir().unwrap();
    let storage = FileTokenStorage::new(dir.path().join("token"));
    storage.save("tok").unwrap();
    let mode = std::fs::metadata(storage.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn file_storage_reports_io_errors_with_path() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be makes both read and write fail.
    let path = dir.path().join("token");
    std::fs::create_dir(&path).unwrap();
    let storage = FileTokenStorage::new(&path);
    let err = storage.save("tok").unwrap_err();
    assert!(err.to_string().contains("token"));
}

#[test]
fn memory_storage_round_trip() {
    let storage = MemoryTokenStorage::new();
    assert_eq!(storage.load().unwrap(), None);
    storage.save("tok").unwrap();
    assert_eq!(storage.load().unwrap().as_deref(), Some("tok"));
    storage.clear().unwrap();
    assert_eq!(storage.load().unwrap(), None);
    assert_eq!(MemoryTokenStorage::with_token("x").load().unwrap().as_deref(), Some("x"));
}

#[cfg(unix)]
#[test]
fn file_storage_tightens_existing_file_before_writing() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token");
    std::fs::write(&path, "old-token-that-is-longer").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

    let storage = FileTokenStorage::new(&path);
    storage.save("new").unwrap();

    assert_eq!(std::fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o600);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
}

#[test]
fn file_storage_failed_save_leaves_no_token() {
    let dir = tempfile::tempdir().unwrap();
    // Parent is a regular file, so the token file can never be created.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    let storage = FileTokenStorage::new(blocker.join("token"));

    assert!(storage.save("tok").is_err());
    assert!(!storage.path().exists());
    assert_eq!(std::fs::read_to_string(&blocker).unwrap(), "");
}
