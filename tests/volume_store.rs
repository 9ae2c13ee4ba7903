//! Integration tests exercising the store factory, buffer accessors, and
//! whole-volume digesting against a real temporary directory.

use sha1::{Digest, Sha1};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use voxelstore::{VolumeDescriptor, VolumeError, VolumeStore, NULL_PLANE, NULL_PLANE_SIZE};

/// SHA-1 of 1024 zero bytes, computed independently of this crate.
const ZERO_VOLUME_DIGEST: [u8; 20] = [
    0x60, 0xca, 0xcb, 0xf3, 0xd7, 0x2e, 0x1e, 0x78, 0x34, 0x20, 0x3d, 0xa6, 0x08, 0x03, 0x7b,
    0x1b, 0xf8, 0x3b, 0x40, 0xe8,
];

fn test_store() -> (TempDir, VolumeStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = VolumeStore::new(temp_dir.path(), "Pixels/").unwrap();
    (temp_dir, store)
}

/// 8 x 8 x 2 z x 2 c x 2 t at 16-bit: 128-byte planes, 1024 bytes total.
fn test_descriptor(id: u64) -> Arc<VolumeDescriptor> {
    Arc::new(VolumeDescriptor::new(id, 8, 8, 2, 2, 2, 16).unwrap())
}

#[test]
fn test_zero_volume_digest_matches_reference() {
    let (_temp_dir, store) = test_store();
    let buffer = store.create(test_descriptor(1)).unwrap();

    assert_eq!(buffer.layout().total_size(), 1024);
    assert_eq!(buffer.calculate_digest().unwrap(), ZERO_VOLUME_DIGEST);
}

#[test]
fn test_digest_equals_whole_span_hash() {
    let (_temp_dir, store) = test_store();
    let buffer = store.create(test_descriptor(2)).unwrap();

    let plane_size = buffer.layout().plane_size() as usize;
    for t in 0..2 {
        for c in 0..2 {
            for z in 0..2 {
                let fill = (t * 4 + c * 2 + z + 1) as u8 * 17;
                buffer.set_plane(z, c, t, &vec![fill; plane_size]).unwrap();
            }
        }
    }

    // The per-timepoint chunking must not change the digest relative to
    // hashing the whole span at once.
    let whole = buffer
        .region(buffer.layout().total_size(), 0)
        .unwrap();
    let mut hasher = Sha1::new();
    hasher.update(whole.as_bytes());
    let expected: [u8; 20] = hasher.finalize().into();

    assert_eq!(buffer.calculate_digest().unwrap(), expected);
    assert_eq!(buffer.digest_with::<Sha1>().unwrap()[..], expected[..]);
    assert_ne!(expected, ZERO_VOLUME_DIGEST);
}

#[test]
fn test_plane_roundtrip() {
    let (_temp_dir, store) = test_store();
    let buffer = store.create(test_descriptor(3)).unwrap();

    let plane_size = buffer.layout().plane_size() as usize;
    let data: Vec<u8> = (0..plane_size).map(|i| (i % 251) as u8).collect();

    buffer.set_plane(1, 0, 1, &data).unwrap();
    let read = buffer.plane(1, 0, 1).unwrap().expect("plane was written");
    assert_eq!(read.as_bytes(), &data[..]);
}

#[test]
fn test_sentinel_prefix_reports_absent_regardless_of_tail() {
    let (_temp_dir, store) = test_store();
    let buffer = store.create(test_descriptor(4)).unwrap();

    // First NULL_PLANE_SIZE bytes are the sentinel, the rest is non-zero
    // payload: the plane must still report absent.
    let plane_size = buffer.layout().plane_size() as usize;
    let mut data = vec![0xABu8; plane_size];
    data[..NULL_PLANE_SIZE].copy_from_slice(&NULL_PLANE);

    buffer.set_plane(0, 1, 0, &data).unwrap();
    assert!(buffer.plane(0, 1, 0).unwrap().is_none());

    // Row accessors do not apply the sentinel check; the raw bytes are
    // still addressable.
    let row = buffer.row(0, 0, 1, 0).unwrap();
    assert_eq!(row.as_bytes(), &data[..row.len()]);

    // One byte off the sentinel and the plane reads as written again.
    data[0] = 0x00;
    buffer.set_plane(0, 1, 0, &data).unwrap();
    assert!(buffer.plane(0, 1, 0).unwrap().is_some());
}

#[test]
fn test_fresh_volume_planes_read_as_zero_not_absent() {
    // A freshly allocated file is all zeros, which does not match the
    // sentinel: planes read as present-but-zero until cleared.
    let (_temp_dir, store) = test_store();
    let buffer = store.create(test_descriptor(5)).unwrap();

    let plane = buffer.plane(0, 0, 0).unwrap().expect("zeros are not the sentinel");
    assert!(plane.iter().all(|&b| b == 0));
}

#[test]
fn test_clear_plane_marks_absent_and_rewrite_restores() {
    let (_temp_dir, store) = test_store();
    let buffer = store.create(test_descriptor(6)).unwrap();

    let plane_size = buffer.layout().plane_size() as usize;
    let data = vec![0x5Au8; plane_size];

    buffer.set_plane(1, 1, 1, &data).unwrap();
    assert!(buffer.plane(1, 1, 1).unwrap().is_some());

    buffer.clear_plane(1, 1, 1).unwrap();
    assert!(buffer.plane(1, 1, 1).unwrap().is_none());

    buffer.set_plane(1, 1, 1, &data).unwrap();
    let read = buffer.plane(1, 1, 1).unwrap().expect("rewritten");
    assert_eq!(read.as_bytes(), &data[..]);
}

#[test]
fn test_region_read_idempotent() {
    let (_temp_dir, store) = test_store();
    let buffer = store.create(test_descriptor(7)).unwrap();

    let data: Vec<u8> = (0..64u32).map(|i| (i * 3) as u8).collect();
    buffer.set_region(64, 128, &data).unwrap();

    let first = buffer.region(64, 128).unwrap();
    let second = buffer.region(64, 128).unwrap();
    assert_eq!(first.as_bytes(), second.as_bytes());
    assert_eq!(first.as_bytes(), &data[..]);
}

#[test]
fn test_region_validation() {
    let (_temp_dir, store) = test_store();
    let buffer = store.create(test_descriptor(8)).unwrap();

    // Buffer length must equal the declared size.
    let err = buffer.set_region(64, 0, &[0u8; 32]).unwrap_err();
    match err {
        VolumeError::RegionSize { expected, actual } => {
            assert_eq!(expected, 64);
            assert_eq!(actual, 32);
        }
        other => panic!("expected RegionSize, got {:?}", other),
    }

    // Ranges may not extend past the end of the volume.
    let err = buffer.region(64, 1000).unwrap_err();
    assert!(matches!(err, VolumeError::RegionBounds { total: 1024, .. }));
    assert!(buffer.region(64, 960).is_ok());
}

#[test]
fn test_accessor_bounds() {
    let (_temp_dir, store) = test_store();
    let buffer = store.create(test_descriptor(9)).unwrap();

    assert!(buffer.row(7, 1, 1, 1).is_ok());

    let err = buffer.row(8, 0, 0, 0).unwrap_err();
    assert_eq!(err.to_string(), "Y index 8 out of bounds for extent 8");

    assert!(buffer.plane(2, 0, 0).is_err());
    assert!(buffer.stack(2, 0).is_err());
    assert!(buffer.timepoint(2).is_err());
    assert!(buffer.set_timepoint(2, &[]).is_err());
}

#[test]
fn test_row_stack_timepoint_coherence() {
    let (_temp_dir, store) = test_store();
    let buffer = store.create(test_descriptor(10)).unwrap();
    let layout = *buffer.layout();

    // Fill timepoint 1 with a distinct byte sequence.
    let timepoint_size = layout.timepoint_size() as usize;
    let data: Vec<u8> = (0..timepoint_size).map(|i| (i % 249) as u8).collect();
    buffer.set_timepoint(1, &data).unwrap();

    let base = layout.timepoint_offset(1);

    let row = buffer.row(3, 1, 1, 1).unwrap();
    let start = (layout.row_offset(3, 1, 1, 1) - base) as usize;
    assert_eq!(row.as_bytes(), &data[start..start + layout.row_size() as usize]);

    let stack = buffer.stack(1, 1).unwrap();
    let start = (layout.stack_offset(1, 1) - base) as usize;
    assert_eq!(
        stack.as_bytes(),
        &data[start..start + layout.stack_size() as usize]
    );

    let timepoint = buffer.timepoint(1).unwrap();
    assert_eq!(timepoint.as_bytes(), &data[..]);

    // Timepoint 0 is untouched.
    assert!(buffer.timepoint(0).unwrap().iter().all(|&b| b == 0));
}

#[test]
fn test_writes_persist_across_reopen() {
    let (_temp_dir, store) = test_store();
    let descriptor = test_descriptor(11);

    let plane_size;
    let data: Vec<u8>;
    {
        let buffer = store.create(Arc::clone(&descriptor)).unwrap();
        plane_size = buffer.layout().plane_size() as usize;
        data = (0..plane_size).map(|i| (i % 253) as u8).collect();
        buffer.set_plane(0, 0, 1, &data).unwrap();
    }

    let buffer = store.open(descriptor).unwrap();
    let read = buffer.plane(0, 0, 1).unwrap().expect("plane persisted");
    assert_eq!(read.as_bytes(), &data[..]);
}

#[test]
fn test_deeply_sharded_id_on_disk() {
    let (temp_dir, store) = test_store();
    let descriptor = Arc::new(VolumeDescriptor::new(1_500_000, 8, 8, 1, 1, 1, 8).unwrap());

    let buffer = store.create(descriptor).unwrap();
    let expected = temp_dir
        .path()
        .join("Pixels/Dir-001/Dir-500/1500000");
    assert_eq!(buffer.path(), expected);
    assert!(fs::metadata(&expected).is_ok());
}
