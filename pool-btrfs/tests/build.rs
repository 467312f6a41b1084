// SPDX-License-Identifier: GPL-3.0-only

mod common;

use common::{FakeFilesystem, ScriptedRunner, Step, backend};
use nix::errno::Errno;
use pool_btrfs::{BtrfsError, Pool, PoolBackend, PoolType, Volume, VolumeType};
use pool_sys::{HostFilesystem, SysError};

fn temp_pool() -> (tempfile::TempDir, Pool) {
    let dir = tempfile::tempdir().unwrap();
    let pool = Pool::new("tmp", PoolType::Btrfs, dir.path().to_str().unwrap());
    (dir, pool)
}

#[test]
fn create_vol_fills_in_definition() {
    let runner = ScriptedRunner::new([]);
    let backend = backend(&runner, FakeFilesystem::default());
    let pool = Pool::new("pool", PoolType::Btrfs, "/srv/pool");
    let mut volume = Volume::named("vm1");

    backend.create_vol(&pool, &mut volume).unwrap();

    assert_eq!(volume.volume_type, VolumeType::Dir);
    assert_eq!(volume.target.path, "/srv/pool/vm1");
    assert_eq!(volume.key, "/srv/pool/vm1");
    assert!(runner.calls().is_empty());
}

#[test]
fn create_vol_refuses_existing_target() {
    let runner = ScriptedRunner::new([]);
    let backend = backend(&runner, FakeFilesystem::default().existing("/srv/pool/vm1"));
    let pool = Pool::new("pool", PoolType::Btrfs, "/srv/pool");
    let mut volume = Volume::named("vm1");

    let err = backend.create_vol(&pool, &mut volume).unwrap_err();

    match err {
        BtrfsError::VolumeExists(path) => assert_eq!(path, "/srv/pool/vm1"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(volume.key.is_empty());
}

#[test]
fn build_creates_empty_subvolume() {
    let (_dir, pool) = temp_pool();
    let runner = ScriptedRunner::new([Step::CreateTarget]);
    let backend = backend(&runner, HostFilesystem);
    let mut volume = Volume::named("vol1");

    backend.create_vol(&pool, &mut volume).unwrap();
    backend.build_vol(&pool, &volume).unwrap();

    assert_eq!(
        runner.calls(),
        vec![format!("btrfs subvolume create {}/vol1", pool.root())]
    );
    assert!(pool.volumes.is_empty());
}

#[test]
fn build_without_definition_resolves_name() {
    let (_dir, pool) = temp_pool();
    let runner = ScriptedRunner::new([Step::CreateTarget]);
    let backend = backend(&runner, HostFilesystem);

    backend.build_vol(&pool, &Volume::named("vol1")).unwrap();

    assert_eq!(
        runner.calls(),
        vec![format!("btrfs subvolume create {}/vol1", pool.root())]
    );
}

#[test]
fn build_fails_when_tool_succeeds_without_creating_target() {
    let (_dir, pool) = temp_pool();
    let runner = ScriptedRunner::new([Step::Output(String::new())]);
    let backend = backend(&runner, HostFilesystem);

    let err = backend.build_vol(&pool, &Volume::named("vol1")).unwrap_err();

    match err {
        BtrfsError::CreationVerification { path } => {
            assert_eq!(path, format!("{}/vol1", pool.root()))
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn build_snapshots_backing_volume() {
    let (dir, pool) = temp_pool();
    std::fs::create_dir(dir.path().join("base")).unwrap();
    let runner = ScriptedRunner::new([Step::CreateTarget]);
    let backend = backend(&runner, HostFilesystem);
    let mut volume = Volume::named("snap").with_backing_store("base");

    backend.create_vol(&pool, &mut volume).unwrap();
    backend.build_vol(&pool, &volume).unwrap();

    assert_eq!(
        runner.calls(),
        vec![format!(
            "btrfs subvolume snapshot {root}/base {root}/snap",
            root = pool.root()
        )]
    );
    assert!(dir.path().join("snap").is_dir());
}

#[test]
fn build_accepts_absolute_backing_path_under_root() {
    let (dir, pool) = temp_pool();
    std::fs::create_dir(dir.path().join("base")).unwrap();
    let runner = ScriptedRunner::new([Step::CreateTarget]);
    let backend = backend(&runner, HostFilesystem);
    let backing = format!("{}/base", pool.root());

    backend
        .build_vol(&pool, &Volume::named("snap").with_backing_store(backing.clone()))
        .unwrap();

    assert_eq!(
        runner.calls(),
        vec![format!("btrfs subvolume snapshot {backing} {}/snap", pool.root())]
    );
}

#[test]
fn inaccessible_backing_store_fails_before_running_tool() {
    let runner = ScriptedRunner::new([]);
    let fs = FakeFilesystem::default().existing("/srv/pool/base");
    let backend = backend(&runner, fs);
    let pool = Pool::new("pool", PoolType::Btrfs, "/srv/pool");

    let err = backend
        .build_vol(&pool, &Volume::named("snap").with_backing_store("base"))
        .unwrap_err();

    match err {
        BtrfsError::BackingStoreInaccessible { path, source } => {
            assert_eq!(path, "base");
            assert!(matches!(
                source,
                SysError::Access {
                    source: Errno::EACCES,
                    ..
                }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(runner.calls().is_empty());
}

#[test]
fn missing_backing_store_is_inaccessible() {
    let (_dir, pool) = temp_pool();
    let runner = ScriptedRunner::new([]);
    let backend = backend(&runner, HostFilesystem);

    let err = backend
        .build_vol(&pool, &Volume::named("snap").with_backing_store("nope"))
        .unwrap_err();

    match err {
        BtrfsError::BackingStoreInaccessible { source, .. } => {
            assert!(matches!(
                source,
                SysError::Access {
                    source: Errno::ENOENT,
                    ..
                }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(runner.calls().is_empty());
}

#[test]
fn tool_failure_fails_build_without_verification() {
    let runner = ScriptedRunner::new([Step::Fail("ERROR: cannot create subvolume".to_string())]);
    let fs = FakeFilesystem::default().existing("/srv/pool/vol1");
    let backend = backend(&runner, fs);
    let pool = Pool::new("pool", PoolType::Btrfs, "/srv/pool");

    let err = backend.build_vol(&pool, &Volume::named("vol1")).unwrap_err();

    assert!(matches!(err, BtrfsError::Process(_)));
    assert_eq!(runner.calls().len(), 1);
}

// Verification failure leaves whatever the tool produced in place.
#[test]
fn snapshot_without_artifact_fails_verification() {
    let runner = ScriptedRunner::new([Step::Output(String::new())]);
    let fs = FakeFilesystem::default().accessible("/srv/pool/base");
    let backend = backend(&runner, fs);
    let pool = Pool::new("pool", PoolType::Btrfs, "/srv/pool");

    let err = backend
        .build_vol(&pool, &Volume::named("snap").with_backing_store("base"))
        .unwrap_err();

    assert!(matches!(err, BtrfsError::CreationVerification { .. }));
    assert_eq!(
        runner.calls(),
        vec!["btrfs subvolume snapshot /srv/pool/base /srv/pool/snap"]
    );
}
