use std::fs::File;
use std::io::prelude::*;
use std::io::SeekFrom;
use std::path::Path;

use super::{Medium, BLOCK_SIZE};
use crate::types::SectorID;

/// Disk image file, or a raw block device node opened as a file
#[derive(Debug)]
pub struct FileMedium {
    file: File,
    num_blocks: u64,
    read_only: bool,
}

impl FileMedium {
    pub fn open<P: AsRef<Path>>(filepath: P) -> std::io::Result<Self> {
        let file = File::options().read(true).write(true).open(filepath)?;
        Self::from_file(file, false)
    }

    /// Writes through a read-only medium report write protection
    pub fn open_read_only<P: AsRef<Path>>(filepath: P) -> std::io::Result<Self> {
        let file = File::open(filepath)?;
        Self::from_file(file, true)
    }

    fn from_file(file: File, read_only: bool) -> std::io::Result<Self> {
        let num_blocks = file.metadata()?.len() / BLOCK_SIZE as u64;
        debug!("Image has {} blocks, read-only {}", num_blocks, read_only);
        Ok(Self { file, num_blocks, read_only })
    }
}

impl Medium for FileMedium {
    type Error = std::io::Error;

    fn num_blocks(&self) -> u64 {
        self.num_blocks
    }

    fn write_protected(&self) -> bool {
        self.read_only
    }

    fn read(&mut self, id: SectorID, buf: &mut [u8]) -> Result<(), Self::Error> {
        let seek = SeekFrom::Start(u64::from(id) * BLOCK_SIZE as u64);
        self.file.seek(seek)?;
        self.file.read_exact(buf)
    }

    fn write(&mut self, id: SectorID, buf: &[u8]) -> Result<(), Self::Error> {
        let seek = SeekFrom::Start(u64::from(id) * BLOCK_SIZE as u64);
        self.file.seek(seek)?;
        self.file.write_all(buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.file.flush()?;
        self.file.sync_data()
    }
}

#[cfg(test)]
mod test {
    use super::FileMedium;
    use crate::io::{Medium, BLOCK_SIZE};
    use crate::types::SectorID;

    #[test]
    fn test_image_file() {
        let path = std::env::temp_dir().join(format!("diskio-{}.img", std::process::id()));
        std::fs::write(&path, vec![0u8; BLOCK_SIZE * 8]).unwrap();

        let mut medium = FileMedium::open(&path).unwrap();
        assert_eq!(medium.num_blocks(), 8);
        assert!(!medium.write_protected());
        let data = [0x33u8; BLOCK_SIZE];
        medium.write(SectorID::from(7u64), &data).unwrap();
        medium.flush().unwrap();
        drop(medium);

        let mut medium = FileMedium::open_read_only(&path).unwrap();
        assert!(medium.write_protected());
        let mut buf = [0u8; BLOCK_SIZE];
        medium.read(SectorID::from(7u64), &mut buf).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(buf, data);
    }
}
