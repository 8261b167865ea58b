//! Byte progress reporting for schema sources read from files.

use std::io::Read;

/// Reader wrapper reporting the running total of bytes read.
///
/// Wraps the raw file, before any decompressor, so the total is comparable
/// with the file size on disk.
pub struct ProgressReader<R: Read> {
    reader: R,
    callback: Box<dyn FnMut(u64)>,
    bytes_read: u64,
}

impl<R: Read> ProgressReader<R> {
    pub fn new<F>(reader: R, callback: F) -> Self
    where
        F: FnMut(u64) + 'static,
    {
        Self {
            reader,
            callback: Box::new(callback),
            bytes_read: 0,
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.reader.read(buf)?;
        if n > 0 {
            self.bytes_read += n as u64;
            (self.callback)(self.bytes_read);
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_reports_running_total() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut reader = ProgressReader::new(&b"CREATE TABLE a (id int);"[..], move |n| {
            sink.borrow_mut().push(n)
        });

        let mut buf = [0u8; 10];
        while reader.read(&mut buf).unwrap() > 0 {}

        assert_eq!(reader.bytes_read(), 24);
        assert_eq!(seen.borrow().as_slice(), &[10, 20, 24]);
    }
}
