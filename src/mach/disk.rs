use super::VmError;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom};

type Result<T> = std::result::Result<T, VmError>;

/// ## Virtual disk
///
/// A fixed-length tape of bytes backed by a real file, with one read-write
/// head. Geometry is set at mount time and the tape is truncated or extended
/// to exactly `sector_size * num_sectors` bytes. Values are stored
/// big-endian: bool and char are one byte, int four, float eight; a char
/// range is a four-byte length followed by its bytes. Every access is
/// bounds-checked so the head can never leave the tape.
#[derive(Debug, Default)]
pub struct VirtualDisk {
    file: Option<File>,
    name: String,
    sector_size: i32,
    max_size: i64,
}

fn io_fault(verb: &'static str, what: &'static str) -> impl FnOnce(std::io::Error) -> VmError {
    move |e| VmError::DiskIo(verb, what, e.to_string())
}

impl VirtualDisk {
    pub fn new() -> VirtualDisk {
        VirtualDisk::default()
    }

    pub fn is_mounted(&self) -> bool {
        self.file.is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn mounted(&mut self) -> Result<&mut File> {
        self.file.as_mut().ok_or(VmError::NoDisk)
    }

    fn pointer_check(&self, pos: i64) -> Result<()> {
        if pos < 0 || pos >= self.max_size {
            return Err(VmError::DiskBounds);
        }
        Ok(())
    }

    /// Rejects any access of `width` bytes that would not fit between the
    /// current head position and the end of the tape.
    fn span_check(&mut self, width: i64) -> Result<i64> {
        let pos = self.position()?;
        self.pointer_check(pos)?;
        self.pointer_check(pos + width - 1)?;
        Ok(pos)
    }

    pub fn mount(&mut self, name: &str, sector_size: i32, num_sectors: i32) -> Result<()> {
        if self.file.is_some() {
            self.unmount()?;
        }
        let max_size = sector_size as i64 * num_sectors as i64;
        if sector_size <= 0 || max_size < sector_size as i64 {
            return Err(VmError::DiskGeometry);
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(name)
            .map_err(|e| VmError::MountFailed(e.to_string()))?;
        file.set_len(max_size as u64)
            .map_err(|e| VmError::MountFailed(e.to_string()))?;
        self.file = Some(file);
        self.name = name.to_string();
        self.sector_size = sector_size;
        self.max_size = max_size;
        self.seek_to(0)
    }

    pub fn unmount(&mut self) -> Result<()> {
        if let Some(file) = self.file.take() {
            file.sync_all()
                .map_err(|e| VmError::UnmountFailed(e.to_string()))?;
        }
        Ok(())
    }

    pub fn sector_size(&self) -> Result<i32> {
        if self.file.is_none() {
            return Err(VmError::NoDisk);
        }
        Ok(self.sector_size)
    }

    pub fn num_sectors(&self) -> Result<i32> {
        if self.file.is_none() {
            return Err(VmError::NoDisk);
        }
        Ok((self.max_size / self.sector_size as i64) as i32)
    }

    pub fn position(&mut self) -> Result<i64> {
        let pos = self
            .mounted()?
            .stream_position()
            .map_err(io_fault("find", "file pointer"))?;
        Ok(pos as i64)
    }

    pub fn sector_position(&mut self, sector: i32) -> Result<i64> {
        self.mounted()?;
        let offset = sector as i64 * self.sector_size as i64;
        self.pointer_check(offset)?;
        Ok(offset)
    }

    pub fn seek_to(&mut self, pos: i64) -> Result<()> {
        self.mounted()?;
        self.pointer_check(pos)?;
        self.mounted()?
            .seek(SeekFrom::Start(pos as u64))
            .map_err(io_fault("seek to", "position"))?;
        Ok(())
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        self.span_check(1)?;
        let byte = self.mounted()?.read_u8().map_err(io_fault("read", "BOOL"))?;
        Ok(byte != 0)
    }

    pub fn read_char(&mut self) -> Result<char> {
        self.span_check(1)?;
        let byte = self.mounted()?.read_u8().map_err(io_fault("read", "CHAR"))?;
        Ok(byte as char)
    }

    pub fn read_int(&mut self) -> Result<i32> {
        self.span_check(4)?;
        self.mounted()?
            .read_i32::<BigEndian>()
            .map_err(io_fault("read", "INT"))
    }

    pub fn read_float(&mut self) -> Result<f64> {
        self.span_check(8)?;
        self.mounted()?
            .read_f64::<BigEndian>()
            .map_err(io_fault("read", "FLOAT"))
    }

    pub fn read_char_range(&mut self) -> Result<String> {
        let size = self.read_int()?;
        if size > 0 {
            self.span_check(size as i64)?;
        }
        let mut range = String::new();
        for _ in 0..size.max(0) {
            let byte = self
                .mounted()?
                .read_u8()
                .map_err(io_fault("read", "CHAR range"))?;
            range.push(byte as char);
        }
        Ok(range)
    }

    pub fn write_bool(&mut self, b: bool) -> Result<i64> {
        let pos = self.span_check(1)?;
        self.mounted()?
            .write_u8(b as u8)
            .map_err(io_fault("write", "BOOL"))?;
        Ok(pos)
    }

    pub fn write_char(&mut self, c: char) -> Result<i64> {
        let pos = self.span_check(1)?;
        self.mounted()?
            .write_u8(c as u8)
            .map_err(io_fault("write", "CHAR"))?;
        Ok(pos)
    }

    pub fn write_int(&mut self, i: i32) -> Result<i64> {
        let pos = self.span_check(4)?;
        self.mounted()?
            .write_i32::<BigEndian>(i)
            .map_err(io_fault("write", "INT"))?;
        Ok(pos)
    }

    pub fn write_float(&mut self, f: f64) -> Result<i64> {
        let pos = self.span_check(8)?;
        self.mounted()?
            .write_f64::<BigEndian>(f)
            .map_err(io_fault("write", "FLOAT"))?;
        Ok(pos)
    }

    pub fn write_char_range(&mut self, range: &str) -> Result<i64> {
        let pos = self.span_check(4 + range.len() as i64)?;
        let file = self.mounted()?;
        file.write_i32::<BigEndian>(range.len() as i32)
            .map_err(io_fault("write", "CHAR range"))?;
        for c in range.chars() {
            file.write_u8(c as u8)
                .map_err(io_fault("write", "CHAR range"))?;
        }
        Ok(pos)
    }
}
