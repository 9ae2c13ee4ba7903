//! Example: allocate a pixel volume, write planes, and read them back
//!
//! Run with: cargo run --example write_volume

use anyhow::Result;
use std::sync::Arc;
use voxelstore::{VolumeDescriptor, VolumeStore};

fn main() -> Result<()> {
    println!("Voxelstore Example: Write Volume");
    println!("================================\n");

    // Back the store with a temp directory; a real deployment points this
    // at the repository root shared with the metadata catalog.
    let temp_dir = tempfile::tempdir()?;
    let store = VolumeStore::new(temp_dir.path(), "Pixels/")?;

    // 256 x 256, 4 z-sections, 2 channels, 3 timepoints, 16-bit samples
    let descriptor = Arc::new(VolumeDescriptor::new(1500, 256, 256, 4, 2, 3, 16)?);
    let buffer = store.create(Arc::clone(&descriptor))?;

    println!("Created volume at: {}", buffer.path().display());
    println!("  {}", buffer.stats().summary());
    println!();

    // Write one focal stack in channel 0, timepoint 0.
    let plane_size = buffer.layout().plane_size() as usize;
    for z in 0..descriptor.size_z() {
        let plane = vec![z as u8 + 1; plane_size];
        buffer.set_plane(z, 0, 0, &plane)?;
    }
    println!("✓ Wrote {} planes in channel 0, timepoint 0", descriptor.size_z());

    match buffer.plane(2, 0, 0)? {
        Some(plane) => println!(
            "✓ Plane (z=2, c=0, t=0) reads back: {} bytes, fill value {}",
            plane.len(),
            plane[0]
        ),
        None => println!("✗ Plane (z=2, c=0, t=0) reads as unwritten"),
    }

    // Mark a plane as unwritten again.
    buffer.clear_plane(1, 0, 0)?;
    match buffer.plane(1, 0, 0)? {
        Some(_) => println!("✗ Plane (z=1, c=0, t=0) still reads as written"),
        None => println!("✓ Plane (z=1, c=0, t=0) cleared and reads as unwritten"),
    }

    // Row-level access maps a single row of one plane.
    let row = buffer.row(128, 2, 0, 0)?;
    println!("✓ Row (y=128, z=2) maps {} bytes", row.len());

    println!("\n✓ Example complete!");
    Ok(())
}
