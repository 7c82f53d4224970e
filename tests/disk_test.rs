mod common;

use common::{run_program, run_with};
use stack_machine::mach::{Val, VirtualDisk, VmError};
use tempfile::TempDir;

fn disk_path(dir: &TempDir, name: &str) -> String {
    dir.path().join(name).to_str().unwrap().to_string()
}

#[test]
fn test_int_round_trip_through_the_tape() {
    let dir = TempDir::new().unwrap();
    let path = disk_path(&dir, "disk.bin");
    let mut disk = VirtualDisk::new();
    disk.mount(&path, 16, 4).unwrap();
    disk.write_int(0x12345678).unwrap();
    assert_eq!(disk.position().unwrap(), 4);
    disk.seek_to(0).unwrap();
    assert_eq!(disk.read_int().unwrap(), 305419896);
    assert_eq!(disk.position().unwrap(), 4);
}

#[test]
fn test_int_is_stored_big_endian() {
    let dir = TempDir::new().unwrap();
    let path = disk_path(&dir, "disk.bin");
    let mut disk = VirtualDisk::new();
    disk.mount(&path, 16, 4).unwrap();
    disk.write_int(0x12345678).unwrap();
    disk.unmount().unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 64);
    assert_eq!(&bytes[0..4], &[0x12, 0x34, 0x56, 0x78]);
}

#[test]
fn test_typed_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = disk_path(&dir, "disk.bin");
    let mut disk = VirtualDisk::new();
    disk.mount(&path, 32, 2).unwrap();
    disk.write_bool(true).unwrap();
    disk.write_char('Q').unwrap();
    disk.write_float(-2.5).unwrap();
    disk.write_char_range("hey").unwrap();
    disk.seek_to(0).unwrap();
    assert!(disk.read_bool().unwrap());
    assert_eq!(disk.read_char().unwrap(), 'Q');
    assert_eq!(disk.read_float().unwrap(), -2.5);
    assert_eq!(disk.read_char_range().unwrap(), "hey");
    // 1 + 1 + 8 + (4 + 3)
    assert_eq!(disk.position().unwrap(), 17);
}

#[test]
fn test_geometry_and_sectors() {
    let dir = TempDir::new().unwrap();
    let path = disk_path(&dir, "disk.bin");
    let mut disk = VirtualDisk::new();
    disk.mount(&path, 16, 4).unwrap();
    assert_eq!(disk.sector_size().unwrap(), 16);
    assert_eq!(disk.num_sectors().unwrap(), 4);
    assert_eq!(disk.sector_position(0).unwrap(), 0);
    assert_eq!(disk.sector_position(3).unwrap(), 48);
    assert!(matches!(
        disk.sector_position(4),
        Err(VmError::DiskBounds)
    ));
}

#[test]
fn test_geometry_must_be_positive() {
    let dir = TempDir::new().unwrap();
    let path = disk_path(&dir, "disk.bin");
    let mut disk = VirtualDisk::new();
    assert!(matches!(
        disk.mount(&path, 0, 4),
        Err(VmError::DiskGeometry)
    ));
    assert!(matches!(
        disk.mount(&path, 16, 0),
        Err(VmError::DiskGeometry)
    ));
    assert!(matches!(
        disk.mount(&path, 16, -1),
        Err(VmError::DiskGeometry)
    ));
}

#[test]
fn test_access_without_a_mounted_disk() {
    let mut disk = VirtualDisk::new();
    assert!(matches!(disk.read_int(), Err(VmError::NoDisk)));
    assert!(matches!(disk.write_bool(true), Err(VmError::NoDisk)));
    assert!(matches!(disk.sector_size(), Err(VmError::NoDisk)));
    assert!(matches!(disk.seek_to(0), Err(VmError::NoDisk)));
    // Unmounting nothing is harmless.
    assert!(disk.unmount().is_ok());
}

#[test]
fn test_accesses_must_fit_on_the_tape() {
    let dir = TempDir::new().unwrap();
    let path = disk_path(&dir, "disk.bin");
    let mut disk = VirtualDisk::new();
    disk.mount(&path, 16, 4).unwrap();
    assert!(matches!(disk.seek_to(64), Err(VmError::DiskBounds)));
    assert!(matches!(disk.seek_to(-1), Err(VmError::DiskBounds)));
    disk.seek_to(61).unwrap();
    assert!(matches!(disk.write_int(1), Err(VmError::DiskBounds)));
    assert!(matches!(disk.read_int(), Err(VmError::DiskBounds)));
    disk.seek_to(60).unwrap();
    disk.write_int(7).unwrap();
    assert_eq!(disk.position().unwrap(), 64);
    // The head is now parked past the last byte; nothing more fits.
    assert!(matches!(disk.read_bool(), Err(VmError::DiskBounds)));
}

#[test]
fn test_remounting_replaces_the_disk() {
    let dir = TempDir::new().unwrap();
    let first = disk_path(&dir, "first.bin");
    let second = disk_path(&dir, "second.bin");
    let mut disk = VirtualDisk::new();
    disk.mount(&first, 16, 4).unwrap();
    disk.mount(&second, 8, 2).unwrap();
    assert_eq!(disk.name(), second);
    assert_eq!(disk.sector_size().unwrap(), 8);
    assert!(std::path::Path::new(&first).exists());
}

#[test]
fn test_disk_program_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = disk_path(&dir, "disk.bin");
    let source = format!(
        "BEGIN
\"\"{}
4 16 MOUNT
0x12345678 WRITEI
0 SEEK
READI
PRINT
UNMOUNT
0 EXIT",
        path
    );
    let outcome = run_program(&source, &[]);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(outcome.out, "305419896");
}

#[test]
fn test_vdinfo_and_vdpos_and_sector() {
    let dir = TempDir::new().unwrap();
    let path = disk_path(&dir, "disk.bin");
    let source = format!(
        "BEGIN
\"\"{}
4 16 MOUNT
VDINFO
VDPOS
2 SECTOR
0 EXIT",
        path
    );
    let result = run_with(&source, &[], |m| m.stack().vec().clone()).unwrap();
    assert_eq!(
        result,
        vec![Val::Int(16), Val::Int(4), Val::Int(0), Val::Int(32)]
    );
}

#[test]
fn test_unmounted_read_in_a_program() {
    let outcome = run_program("BEGIN READI 0 EXIT", &[]);
    assert_eq!(outcome.fatal(), "VM FATAL: READI: No disk has been mounted.");
}

#[test]
fn test_string_round_trip_in_a_program() {
    let dir = TempDir::new().unwrap();
    let path = disk_path(&dir, "disk.bin");
    let source = format!(
        "BEGIN
\"\"{}
4 16 MOUNT
\"\"tape says hi
WRITESTR
0 SEEK
READSTR
PRINTSTR
0 EXIT",
        path
    );
    let outcome = run_program(&source, &[]);
    assert_eq!(outcome.out, "tape says hi");
}
